//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `LIFEX_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`).
//!   Without it, sessions and the password override are kept in memory only.
//! - `LIFEX_HOST` - Bind address (default: 127.0.0.1)
//! - `LIFEX_PORT` - Listen port (default: 3000)
//! - `LIFEX_BASE_URL` - Public URL of the site (default: `http://localhost:3000`)
//! - `LIFEX_SITE_DIR` - Directory holding the site's static pages (default: `public`)
//! - `LIFEX_DEFAULT_PASSWORD` - Password used until one is set (default: `admin123`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sentry sampling (default: 1.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use lifex_core::{AdminPassword, DEFAULT_PASSWORD, GatePaths};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin application configuration.
#[derive(Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the site
    pub base_url: String,
    /// Directory holding the static site pages
    pub site_dir: PathBuf,
    /// Password in force until an override is stored
    pub default_password: SecretString,
    /// Fixed page paths (login, landing, after-login)
    pub paths: GatePaths,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .field("site_dir", &self.site_dir)
            .field("default_password", &"[REDACTED]")
            .field("paths", &self.paths)
            .field("sentry_dsn", &self.sentry_dsn)
            .field("sentry_environment", &self.sentry_environment)
            .finish_non_exhaustive()
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_owned(),
            site_dir: PathBuf::from("public"),
            default_password: SecretString::from(DEFAULT_PASSWORD),
            paths: GatePaths::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("LIFEX_DATABASE_URL");
        let host = get_env_or_default("LIFEX_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("LIFEX_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("LIFEX_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("LIFEX_PORT".to_string(), e.to_string()))?;
        let base_url = get_env_or_default("LIFEX_BASE_URL", "http://localhost:3000");
        validate_base_url(&base_url)?;
        let site_dir = PathBuf::from(get_env_or_default("LIFEX_SITE_DIR", "public"));
        let default_password = get_default_password("LIFEX_DEFAULT_PASSWORD")?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            site_dir,
            default_password,
            paths: GatePaths::default(),
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns `true` when the site is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Returns `true` if the built-in default password is in force.
    #[must_use]
    pub fn uses_builtin_password(&self) -> bool {
        self.default_password.expose_secret() == DEFAULT_PASSWORD
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Option<SecretString> {
    get_optional_env(primary_key)
        .or_else(|| get_optional_env("DATABASE_URL"))
        .map(SecretString::from)
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Load the deployment default password, enforcing the same rules as a
/// password change.
fn get_default_password(key: &str) -> Result<SecretString, ConfigError> {
    let Some(value) = get_optional_env(key) else {
        return Ok(SecretString::from(DEFAULT_PASSWORD));
    };
    AdminPassword::parse(&value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    Ok(SecretString::from(value))
}

/// Validate that the base URL has an http(s) scheme.
fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    if base_url.starts_with("http://") || base_url.starts_with("https://") {
        return Ok(());
    }
    Err(ConfigError::InvalidEnvVar(
        "LIFEX_BASE_URL".to_string(),
        format!("must start with http:// or https:// (got {base_url})"),
    ))
}
