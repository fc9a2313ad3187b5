//! Database operations for the admin `PostgreSQL` schema.
//!
//! # Schema: `lifex`
//!
//! ## Tables
//!
//! - `settings` - Key/value settings (the admin password override lives here)
//! - `session` - tower-sessions session records (created by the session store,
//!   purged hourly by [`spawn_session_cleanup`])
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p lifex-cli -- migrate
//! ```

pub mod settings;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tower_sessions::ExpiredDeletion;
use tower_sessions_sqlx_store::PostgresStore;

/// Schema holding every admin table.
pub const SCHEMA: &str = "lifex";

/// Table used by the session store.
pub const SESSION_TABLE: &str = "session";

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The settings cache could not be read.
    #[error("settings cache error: {0}")]
    Cache(#[from] lifex_core::StorageError),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Build the `PostgreSQL` session store in the admin schema.
///
/// # Errors
///
/// Returns an error if the schema or table name is rejected by the store.
pub fn session_store(pool: &PgPool) -> Result<PostgresStore, sqlx::Error> {
    let store = PostgresStore::new(pool.clone())
        .with_schema_name(SCHEMA)
        .map_err(|e| sqlx::Error::Configuration(e.into()))?
        .with_table_name(SESSION_TABLE)
        .map_err(|e| sqlx::Error::Configuration(e.into()))?;
    Ok(store)
}

/// How often expired session records are purged.
pub const SESSION_CLEANUP_PERIOD: Duration = Duration::from_secs(60 * 60);

/// Purge expired session records from `store` in the background.
pub fn spawn_session_cleanup(store: PostgresStore) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = store
            .continuously_delete_expired(SESSION_CLEANUP_PERIOD)
            .await
        {
            tracing::error!(error = %e, "expired session cleanup stopped");
        }
    })
}

/// Run the admin migrations and create the session table.
///
/// # Errors
///
/// Returns an error if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<(), RepositoryError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    session_store(pool)?.migrate().await?;
    Ok(())
}
