//! Independent "is there a live session?" signals.
//!
//! Two sources can each grant access on their own: the admin's local
//! session record, and the hosted backend's persisted auth token.

use crate::storage::Storage;
use crate::types::{BackendAuthToken, keys};

use super::session_store::SessionRecordStore;

/// A source of session validity.
pub trait SessionSignal {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Returns `true` if this source considers the session live at `now_ms`.
    fn is_valid(&self, now_ms: i64) -> bool;
}

impl<S: Storage> SessionSignal for SessionRecordStore<S> {
    fn name(&self) -> &'static str {
        "local_session"
    }

    /// Checks the local record. An expired record is cleared.
    fn is_valid(&self, now_ms: i64) -> bool {
        let Some(record) = self.read() else {
            return false;
        };

        if record.is_expired_at(now_ms) {
            tracing::debug!(
                issued_or_refreshed_at = record.issued_or_refreshed_at,
                "local session expired"
            );
            if let Err(e) = self.clear() {
                tracing::warn!(error = %e, "failed to clear expired session");
            }
            return false;
        }

        record.authenticated
    }
}

/// Reads the hosted backend's auth token from persistent storage.
///
/// The token is never written or refreshed here.
#[derive(Debug, Clone)]
pub struct BackendTokenSignal<S> {
    storage: S,
}

impl<S: Storage> BackendTokenSignal<S> {
    /// Wrap `storage`.
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Parse every backend token in storage.
    ///
    /// Keys that cannot be read or parsed are skipped.
    pub fn tokens(&self) -> Vec<BackendAuthToken> {
        let Ok(names) = self.storage.keys() else {
            return Vec::new();
        };

        names
            .into_iter()
            .filter(|k| keys::is_backend_token_key(k))
            .filter_map(|key| {
                let raw = self.storage.get_item(&key).ok()??;
                BackendAuthToken::parse(&raw)
                    .inspect_err(|e| {
                        tracing::debug!(key = %key, error = %e, "unreadable backend token");
                    })
                    .ok()
            })
            .collect()
    }
}

impl<S: Storage> SessionSignal for BackendTokenSignal<S> {
    fn name(&self) -> &'static str {
        "backend_token"
    }

    fn is_valid(&self, now_ms: i64) -> bool {
        self.tokens().iter().any(|t| t.is_valid_at(now_ms))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::types::SessionRecord;

    const MINUTE: i64 = 60 * 1000;

    #[test]
    fn test_local_signal_accepts_fresh_record() {
        let store = SessionRecordStore::new(MemoryStorage::new());
        store.write(&SessionRecord::issue(0)).unwrap();
        assert!(store.is_valid(29 * MINUTE));
        assert!(store.read().is_some());
    }

    #[test]
    fn test_local_signal_clears_expired_record() {
        let store = SessionRecordStore::new(MemoryStorage::new());
        store.write(&SessionRecord::issue(0)).unwrap();
        assert!(!store.is_valid(31 * MINUTE));
        assert_eq!(store.read(), None);
    }

    #[test]
    fn test_local_signal_rejects_unauthenticated_record() {
        let store = SessionRecordStore::new(MemoryStorage::new());
        store
            .write(&SessionRecord {
                authenticated: false,
                issued_or_refreshed_at: 0,
            })
            .unwrap();
        assert!(!store.is_valid(0));
    }

    #[test]
    fn test_backend_signal_finds_token_key() {
        let storage = MemoryStorage::new();
        storage
            .set_item(
                "sb-project-auth-token",
                r#"{"access_token":"abc","expires_at":2000}"#.to_owned(),
            )
            .unwrap();
        let signal = BackendTokenSignal::new(&storage);
        assert!(signal.is_valid(1_999_999));
        assert!(!signal.is_valid(2_000_000));
    }

    #[test]
    fn test_backend_signal_without_token_is_invalid() {
        let storage = MemoryStorage::new();
        storage
            .set_item(keys::PASSWORD, "whatever".to_owned())
            .unwrap();
        assert!(!BackendTokenSignal::new(&storage).is_valid(0));
    }

    #[test]
    fn test_backend_signal_with_garbage_is_invalid() {
        let storage = MemoryStorage::new();
        storage
            .set_item("sb-project-auth-token", "%%%".to_owned())
            .unwrap();
        assert!(!BackendTokenSignal::new(&storage).is_valid(0));
    }

    #[test]
    fn test_backend_signal_checks_every_project_token() {
        let storage = MemoryStorage::new();
        storage
            .set_item(
                "sb-aaaa-auth-token",
                r#"{"access_token":"old","expires_at":1000}"#.to_owned(),
            )
            .unwrap();
        storage
            .set_item("sb-bbbb-auth-token", "not json".to_owned())
            .unwrap();
        storage
            .set_item(
                "sb-cccc-auth-token",
                r#"{"access_token":"live","expires_at":5000}"#.to_owned(),
            )
            .unwrap();

        let signal = BackendTokenSignal::new(&storage);
        assert_eq!(signal.tokens().len(), 2);
        assert!(signal.is_valid(4_000_000));
    }

    #[test]
    fn test_backend_signal_ignores_code_verifier() {
        let storage = MemoryStorage::new();
        storage
            .set_item(
                "sb-project-auth-token-code-verifier",
                "verifier-string".to_owned(),
            )
            .unwrap();
        storage
            .set_item(
                "sb-project-auth-token",
                r#"{"access_token":"abc","expires_at":2000}"#.to_owned(),
            )
            .unwrap();

        let signal = BackendTokenSignal::new(&storage);
        assert_eq!(signal.tokens().len(), 1);
        assert!(signal.is_valid(1_000_000));
    }
}
