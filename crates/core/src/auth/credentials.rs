//! Credential manager.
//!
//! Owns the admin password (stored override or default) and issues,
//! refreshes and clears session records.

use secrecy::{ExposeSecret, SecretString};

use crate::clock::Clock;
use crate::storage::Storage;
use crate::types::{AdminPassword, CredentialError, DEFAULT_PASSWORD, SessionRecord, keys};

use super::navigation::Navigation;
use super::session_store::SessionRecordStore;
use super::signal::SessionSignal;

/// The admin password, stored in persistent storage with a fallback default.
#[derive(Debug, Clone)]
pub struct Credentials<K> {
    storage: K,
    default: SecretString,
}

impl<K: Storage> Credentials<K> {
    /// Credentials over `storage`, falling back to [`DEFAULT_PASSWORD`].
    pub fn new(storage: K) -> Self {
        Self::with_default(storage, SecretString::from(DEFAULT_PASSWORD))
    }

    /// Credentials over `storage`, falling back to `default`.
    pub const fn with_default(storage: K, default: SecretString) -> Self {
        Self { storage, default }
    }

    /// The password currently in force.
    ///
    /// An empty or unreadable override falls back to the default.
    pub fn current(&self) -> SecretString {
        match self.storage.get_item(keys::PASSWORD) {
            Ok(Some(stored)) if !stored.is_empty() => SecretString::from(stored),
            Ok(_) => self.default.clone(),
            Err(e) => {
                tracing::warn!(error = %e, "password storage read failed, using default");
                self.default.clone()
            }
        }
    }

    /// Returns `true` if no override is stored.
    pub fn is_default(&self) -> bool {
        !matches!(self.storage.get_item(keys::PASSWORD), Ok(Some(stored)) if !stored.is_empty())
    }

    /// Replace the stored password.
    ///
    /// Existing sessions stay valid.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::TooShort`] for passwords under six
    /// characters, or [`CredentialError::Storage`] if it cannot be stored.
    pub fn change(&self, new_password: &str) -> Result<(), CredentialError> {
        let password = AdminPassword::parse(new_password)?;
        self.storage
            .set_item(keys::PASSWORD, password.expose().to_owned())?;
        tracing::info!("admin password changed");
        Ok(())
    }

    /// Remove the stored override so the default applies again.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Storage`] if the override cannot be removed.
    pub fn reset(&self) -> Result<(), CredentialError> {
        self.storage.remove_item(keys::PASSWORD)?;
        tracing::info!("admin password reset to default");
        Ok(())
    }

    /// Exact comparison of `submitted` against the current password.
    pub fn verify(&self, submitted: &str) -> bool {
        self.current().expose_secret() == submitted
    }
}

/// Login, logout and session refresh on top of [`Credentials`].
///
/// There is no lockout or attempt counting.
#[derive(Debug, Clone)]
pub struct CredentialManager<T, K, C> {
    credentials: Credentials<K>,
    sessions: SessionRecordStore<T>,
    clock: C,
    landing: String,
}

impl<T: Storage, K: Storage, C: Clock> CredentialManager<T, K, C> {
    /// Create a manager writing sessions to tab storage `tab`.
    pub fn new(tab: T, credentials: Credentials<K>, clock: C, landing: impl Into<String>) -> Self {
        Self {
            credentials,
            sessions: SessionRecordStore::new(tab),
            clock,
            landing: landing.into(),
        }
    }

    /// The password currently in force.
    pub fn get_current_credential(&self) -> SecretString {
        self.credentials.current()
    }

    /// Replace the stored password.
    ///
    /// # Errors
    ///
    /// See [`Credentials::change`].
    pub fn change_credential(&self, new_password: &str) -> Result<(), CredentialError> {
        self.credentials.change(new_password)
    }

    /// Check `submitted` and, on a match, issue a new session record.
    ///
    /// A mismatch leaves storage untouched. A session that cannot be
    /// written counts as a failed login.
    pub fn login(&self, submitted: &str) -> bool {
        if !self.credentials.verify(submitted) {
            tracing::warn!("admin login rejected");
            return false;
        }

        match self
            .sessions
            .write(&SessionRecord::issue(self.clock.now_millis()))
        {
            Ok(()) => {
                tracing::info!("admin login accepted");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "could not store session after login");
                false
            }
        }
    }

    /// Clear the session record and return the navigation to the landing page.
    pub fn logout(&self) -> Navigation {
        if let Err(e) = self.sessions.clear() {
            tracing::warn!(error = %e, "failed to clear session on logout");
        }
        tracing::info!("admin logged out");
        Navigation::push(self.landing.clone())
    }

    /// Move the session timestamp to now if the local session is live.
    ///
    /// Returns `true` if the record was refreshed.
    pub fn refresh_session(&self) -> bool {
        let now = self.clock.now_millis();
        if !self.sessions.is_valid(now) {
            return false;
        }

        match self.sessions.write(&SessionRecord::issue(now)) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "failed to refresh session");
                false
            }
        }
    }

    /// The session store adapter this manager writes.
    pub const fn sessions(&self) -> &SessionRecordStore<T> {
        &self.sessions
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStorage;

    const MINUTE: i64 = 60 * 1000;

    fn manager<'a>(
        tab: &'a MemoryStorage,
        persistent: &'a MemoryStorage,
        clock: &'a ManualClock,
    ) -> CredentialManager<&'a MemoryStorage, &'a MemoryStorage, &'a ManualClock> {
        CredentialManager::new(tab, Credentials::new(persistent), clock, "/")
    }

    #[test]
    fn test_default_password_when_nothing_stored() {
        let storage = MemoryStorage::new();
        let credentials = Credentials::new(&storage);
        assert_eq!(credentials.current().expose_secret(), DEFAULT_PASSWORD);
        assert!(credentials.is_default());
    }

    #[test]
    fn test_empty_override_falls_back_to_default() {
        let storage = MemoryStorage::new();
        storage.set_item(keys::PASSWORD, String::new()).unwrap();
        assert!(Credentials::new(&storage).verify(DEFAULT_PASSWORD));
    }

    #[test]
    fn test_custom_default() {
        let storage = MemoryStorage::new();
        let credentials =
            Credentials::with_default(&storage, SecretString::from("deploy-default"));
        assert!(credentials.verify("deploy-default"));
        assert!(!credentials.verify(DEFAULT_PASSWORD));
    }

    #[test]
    fn test_change_rejects_short_password() {
        let (tab, persistent) = (MemoryStorage::new(), MemoryStorage::new());
        let clock = ManualClock::new(0);
        let manager = manager(&tab, &persistent, &clock);

        let err = manager.change_credential("abc").unwrap_err();
        assert!(matches!(err, CredentialError::TooShort { .. }));
        assert!(persistent.is_empty());
    }

    #[test]
    fn test_change_then_login_with_new_password_only() {
        let (tab, persistent) = (MemoryStorage::new(), MemoryStorage::new());
        let clock = ManualClock::new(0);
        let manager = manager(&tab, &persistent, &clock);

        manager.change_credential("abcdef").unwrap();
        assert_eq!(
            persistent.get_item(keys::PASSWORD).unwrap().as_deref(),
            Some("abcdef")
        );

        assert!(!manager.login(DEFAULT_PASSWORD));
        assert!(tab.is_empty());
        assert!(manager.login("abcdef"));
        assert!(manager.sessions().read().is_some());
    }

    #[test]
    fn test_change_does_not_invalidate_sessions() {
        let (tab, persistent) = (MemoryStorage::new(), MemoryStorage::new());
        let clock = ManualClock::new(0);
        let manager = manager(&tab, &persistent, &clock);

        assert!(manager.login(DEFAULT_PASSWORD));
        manager.change_credential("n3w-password").unwrap();
        assert!(manager.sessions().is_valid(MINUTE));
    }

    #[test]
    fn test_login_is_exact_match() {
        let (tab, persistent) = (MemoryStorage::new(), MemoryStorage::new());
        let clock = ManualClock::new(0);
        let manager = manager(&tab, &persistent, &clock);

        for wrong in ["", "admin12", "admin1234", "ADMIN123", " admin123"] {
            assert!(!manager.login(wrong), "{wrong:?} must not log in");
        }
        assert!(tab.is_empty());
    }

    #[test]
    fn test_login_issues_record_at_now() {
        let (tab, persistent) = (MemoryStorage::new(), MemoryStorage::new());
        let clock = ManualClock::new(1_234);
        let manager = manager(&tab, &persistent, &clock);

        assert!(manager.login(DEFAULT_PASSWORD));
        assert_eq!(manager.sessions().read(), Some(SessionRecord::issue(1_234)));
    }

    #[test]
    fn test_logout_clears_and_goes_to_landing() {
        let (tab, persistent) = (MemoryStorage::new(), MemoryStorage::new());
        let clock = ManualClock::new(0);
        let manager = manager(&tab, &persistent, &clock);

        assert!(manager.login(DEFAULT_PASSWORD));
        assert_eq!(manager.logout(), Navigation::push("/"));
        assert_eq!(manager.sessions().read(), None);
    }

    #[test]
    fn test_refresh_moves_timestamp_for_live_session() {
        let (tab, persistent) = (MemoryStorage::new(), MemoryStorage::new());
        let clock = ManualClock::new(0);
        let manager = manager(&tab, &persistent, &clock);

        assert!(manager.login(DEFAULT_PASSWORD));
        clock.set(10 * MINUTE);
        assert!(manager.refresh_session());
        assert_eq!(
            manager.sessions().read(),
            Some(SessionRecord::issue(10 * MINUTE))
        );
    }

    #[test]
    fn test_refresh_does_not_resurrect_expired_session() {
        let (tab, persistent) = (MemoryStorage::new(), MemoryStorage::new());
        let clock = ManualClock::new(0);
        let manager = manager(&tab, &persistent, &clock);

        assert!(!manager.refresh_session());
        assert!(manager.login(DEFAULT_PASSWORD));
        clock.set(45 * MINUTE);
        assert!(!manager.refresh_session());
        assert_eq!(manager.sessions().read(), None);
    }

    #[test]
    fn test_reset_restores_default() {
        let storage = MemoryStorage::new();
        let credentials = Credentials::new(&storage);
        credentials.change("abcdef").unwrap();
        assert!(!credentials.is_default());
        credentials.reset().unwrap();
        assert!(credentials.verify(DEFAULT_PASSWORD));
    }
}
