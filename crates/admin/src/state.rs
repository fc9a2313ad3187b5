//! Application state shared across handlers.

use std::sync::Arc;

use lifex_core::{Clock, Credentials, MemoryStorage, PageGate, SystemClock, keys};
use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::db::RepositoryError;
use crate::storage::{CookieStorage, SettingsStorage};

/// The gate as the server runs it: tab storage from the session, backend
/// token from cookies, password override from settings.
pub type RequestGate<'a> =
    PageGate<&'a MemoryStorage, CookieStorage, &'a SettingsStorage, Arc<dyn Clock>>;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: Option<PgPool>,
    settings: SettingsStorage,
    clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create a new application state using the system clock.
    ///
    /// # Arguments
    ///
    /// * `config` - Admin configuration
    /// * `pool` - `PostgreSQL` connection pool, if a database is configured
    /// * `settings` - Settings storage holding the password override
    #[must_use]
    pub fn new(config: AdminConfig, pool: Option<PgPool>, settings: SettingsStorage) -> Self {
        Self::with_clock(config, pool, settings, Arc::new(SystemClock))
    }

    /// Create a new application state reading time from `clock`.
    #[must_use]
    pub fn with_clock(
        config: AdminConfig,
        pool: Option<PgPool>,
        settings: SettingsStorage,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                settings,
                clock,
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get the database connection pool, if one is configured.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    /// Get the settings storage.
    #[must_use]
    pub fn settings(&self) -> &SettingsStorage {
        &self.inner.settings
    }

    /// The admin credentials, falling back to the configured default password.
    #[must_use]
    pub fn credentials(&self) -> Credentials<&SettingsStorage> {
        Credentials::with_default(
            &self.inner.settings,
            self.inner.config.default_password.clone(),
        )
    }

    /// Build the gate for one request.
    #[must_use]
    pub fn page_gate<'a>(&'a self, tab: &'a MemoryStorage, tokens: CookieStorage) -> RequestGate<'a> {
        PageGate::new(
            tab,
            tokens,
            self.credentials(),
            Arc::clone(&self.inner.clock),
            self.inner.config.paths.clone(),
        )
    }

    /// Re-read the stored password so changes made outside this process
    /// apply without a restart.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read; the cached password
    /// stays in force.
    pub async fn reload_credentials(&self) -> Result<(), RepositoryError> {
        self.inner.settings.reload(keys::PASSWORD).await
    }

    /// Persist settings changed during the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be written to the database.
    pub async fn flush_settings(&self) -> Result<(), RepositoryError> {
        self.inner.settings.flush().await
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("persistent", &self.inner.settings.is_persistent())
            .finish_non_exhaustive()
    }
}
