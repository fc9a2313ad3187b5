//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! lifex-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `LIFEX_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Admin migrations: `crates/admin/migrations/`. The session table is created
//! by the session store after the embedded migrations have run.

use lifex_admin::db;

use super::{CommandError, connect};

/// Run the admin migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running admin migrations...");
    db::migrate(&pool).await?;

    tracing::info!("Admin migrations complete!");
    Ok(())
}
