//! Storage key names.
//!
//! These names are shared with pages that still read storage directly and
//! must not change.

/// Tab-scoped key holding the serialized [`SessionRecord`](super::SessionRecord).
pub const SESSION: &str = "lifex_admin_session";

/// Persistent key holding the admin password override.
pub const PASSWORD: &str = "lifex_admin_password";

/// Tab-scoped key holding the one-shot post-login redirect target.
pub const REDIRECT_AFTER_LOGIN: &str = "redirect_after_login";

/// Returns `true` for keys written by the hosted backend's auth client
/// (`sb-<project-ref>-auth-token`). Sibling keys such as
/// `sb-<project-ref>-auth-token-code-verifier` do not hold a session.
#[must_use]
pub fn is_backend_token_key(key: &str) -> bool {
    key.strip_prefix("sb-")
        .and_then(|rest| rest.strip_suffix("-auth-token"))
        .is_some_and(|project_ref| !project_ref.is_empty())
}
