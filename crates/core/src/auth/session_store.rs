//! Session store adapter.
//!
//! Reads and writes the [`SessionRecord`] and the pending redirect target in
//! tab-scoped storage. Reads never fail: anything that cannot be read or
//! decoded is reported as absent.

use crate::storage::{Storage, StorageError};
use crate::types::{SessionRecord, keys};

use super::navigation::is_local_path;

/// Adapter over the tab-scoped storage keys used by the admin gate.
#[derive(Debug, Clone)]
pub struct SessionRecordStore<S> {
    storage: S,
}

impl<S: Storage> SessionRecordStore<S> {
    /// Wrap `storage`.
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Read the session record.
    ///
    /// Returns `None` if the key is missing, the backend fails, or the
    /// stored value is not a valid record.
    pub fn read(&self) -> Option<SessionRecord> {
        let raw = match self.storage.get_item(keys::SESSION) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, "session storage read failed");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!(error = %e, "discarding malformed session record");
                None
            }
        }
    }

    /// Store `record`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    pub fn write(&self, record: &SessionRecord) -> Result<(), StorageError> {
        let raw = serde_json::to_string(record)
            .map_err(|e| StorageError::Unavailable(format!("encode session record: {e}")))?;
        self.storage.set_item(keys::SESSION, raw)
    }

    /// Remove the session record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the removal.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_item(keys::SESSION)
    }

    /// Remember where to send the user after the next successful login.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    pub fn set_pending_redirect(&self, target: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(keys::REDIRECT_AFTER_LOGIN, target.to_owned())
    }

    /// Read and remove the pending redirect target.
    ///
    /// A stored target that is not a path on this site is discarded.
    pub fn take_pending_redirect(&self) -> Option<String> {
        let target = self
            .storage
            .get_item(keys::REDIRECT_AFTER_LOGIN)
            .ok()
            .flatten();
        if let Err(e) = self.storage.remove_item(keys::REDIRECT_AFTER_LOGIN) {
            tracing::warn!(error = %e, "failed to clear pending redirect");
        }
        target.filter(|t| {
            let local = is_local_path(t);
            if !local {
                tracing::warn!(redirect = %t, "discarding off-site redirect target");
            }
            local
        })
    }

    /// The wrapped storage.
    pub const fn storage(&self) -> &S {
        &self.storage
    }
}
