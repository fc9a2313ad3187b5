//! Session record type.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How long a session stays valid after it was issued or last refreshed.
pub const SESSION_DURATION: Duration = Duration::from_secs(30 * 60);

/// Authentication state for one admin browsing session.
///
/// Serialized as `{"authenticated": bool, "timestamp": number}` so that pages
/// reading tab storage directly keep working.
///
/// ## Examples
///
/// ```
/// use lifex_core::SessionRecord;
///
/// let record = SessionRecord::issue(1_000);
/// assert!(record.is_valid_at(1_000 + 30 * 60 * 1000));
/// assert!(!record.is_valid_at(1_001 + 30 * 60 * 1000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Always `true` for a record written by a successful login.
    pub authenticated: bool,
    /// Epoch milliseconds of creation or last refresh.
    #[serde(rename = "timestamp")]
    pub issued_or_refreshed_at: i64,
}

impl SessionRecord {
    /// Create a freshly issued, authenticated record.
    #[must_use]
    pub const fn issue(now_ms: i64) -> Self {
        Self {
            authenticated: true,
            issued_or_refreshed_at: now_ms,
        }
    }

    /// Returns `true` once more than [`SESSION_DURATION`] has passed since
    /// the record was issued or refreshed.
    #[must_use]
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms.saturating_sub(self.issued_or_refreshed_at) > duration_ms()
    }

    /// Returns `true` if the record grants access at `now_ms`.
    #[must_use]
    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        self.authenticated && !self.is_expired_at(now_ms)
    }
}

#[allow(clippy::cast_possible_truncation)] // 30 minutes fits in i64 milliseconds
const fn duration_ms() -> i64 {
    SESSION_DURATION.as_millis() as i64
}
