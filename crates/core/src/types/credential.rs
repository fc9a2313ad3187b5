//! Admin password type.

use core::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::storage::StorageError;

/// Password used when no override has been stored.
pub const DEFAULT_PASSWORD: &str = "admin123";

/// Errors that can occur when validating or persisting an [`AdminPassword`].
#[derive(thiserror::Error, Debug)]
pub enum CredentialError {
    /// The new password is shorter than [`AdminPassword::MIN_LENGTH`].
    #[error("password must be at least {min} characters (got {actual})")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
        /// Length of the rejected input.
        actual: usize,
    },
    /// The password could not be written to storage.
    #[error("could not store password: {0}")]
    Storage(#[from] StorageError),
}

/// A validated admin password.
///
/// ## Constraints
///
/// - Length: at least 6 characters
///
/// ## Examples
///
/// ```
/// use lifex_core::AdminPassword;
///
/// assert!(AdminPassword::parse("abcdef").is_ok());
/// assert!(AdminPassword::parse("abc").is_err());
/// ```
#[derive(Clone)]
pub struct AdminPassword(SecretString);

impl AdminPassword {
    /// Minimum number of characters.
    pub const MIN_LENGTH: usize = 6;

    /// Parse an `AdminPassword` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::TooShort`] if the input has fewer than
    /// [`Self::MIN_LENGTH`] characters.
    pub fn parse(s: &str) -> Result<Self, CredentialError> {
        let actual = s.chars().count();
        if actual < Self::MIN_LENGTH {
            return Err(CredentialError::TooShort {
                min: Self::MIN_LENGTH,
                actual,
            });
        }
        Ok(Self(SecretString::from(s)))
    }

    /// Expose the plain password.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for AdminPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminPassword([REDACTED])")
    }
}
