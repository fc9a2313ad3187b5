//! Admin password commands.
//!
//! # Usage
//!
//! ```bash
//! # Store a new admin password
//! lifex-cli password set 'n3w-passw0rd'
//!
//! # Remove the stored password so the default applies again
//! lifex-cli password reset
//! ```
//!
//! A running server re-reads the stored password on every login attempt,
//! so no restart is needed.

use lifex_admin::storage::SettingsStorage;
use lifex_core::Credentials;

use super::{CommandError, connect};

/// Store `new_password` as the admin password.
///
/// # Errors
///
/// Returns an error if the password is too short or cannot be stored.
pub async fn set(new_password: &str) -> Result<(), CommandError> {
    let settings = SettingsStorage::load(connect().await?).await?;
    Credentials::new(&settings).change(new_password)?;
    settings.flush().await?;

    tracing::info!("Admin password updated; it applies from the next login");
    Ok(())
}

/// Remove the stored admin password override.
///
/// # Errors
///
/// Returns an error if the override cannot be removed.
pub async fn reset() -> Result<(), CommandError> {
    let settings = SettingsStorage::load(connect().await?).await?;
    Credentials::new(&settings).reset()?;
    settings.flush().await?;

    tracing::info!("Admin password reset; the default password applies");
    Ok(())
}
