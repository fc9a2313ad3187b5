//! Hosted backend auth token type.

use serde::Deserialize;

/// The subset of the hosted backend's persisted auth session that the gate
/// inspects. Any other fields in the blob are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackendAuthToken {
    /// Bearer token issued by the backend.
    #[serde(default)]
    pub access_token: String,
    /// Expiry as epoch seconds, when the backend provided one.
    #[serde(default)]
    pub expires_at: Option<i64>,
}

impl BackendAuthToken {
    /// Parse the JSON blob stored by the backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob is not a JSON object of the expected shape.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Returns `true` if the token carries an access token that has not
    /// reached its expiry at `now_ms`.
    #[must_use]
    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        self.expires_at
            .is_none_or(|expires_at| now_ms < expires_at.saturating_mul(1000))
    }
}
