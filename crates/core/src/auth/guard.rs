//! Auth guard.
//!
//! Decides whether a page may be produced at all. The decision is
//! synchronous and must run before any other page logic.

use crate::clock::Clock;
use crate::storage::Storage;

use super::navigation::{GatePaths, Navigation, is_local_path};
use super::session_store::SessionRecordStore;
use super::signal::{BackendTokenSignal, SessionSignal};

/// Result of [`AuthGuard::enforce`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enforcement {
    /// The path is the login page; nothing was checked.
    Exempt,
    /// A live session was found.
    Allowed,
    /// No live session. The caller must stop producing the page and
    /// navigate here.
    Redirect(Navigation),
}

/// Page access guard.
///
/// Access is granted when either the local session record or the hosted
/// backend's token is live. Anything unreadable counts as "no session".
#[derive(Debug, Clone)]
pub struct AuthGuard<T, B, C> {
    sessions: SessionRecordStore<T>,
    backend: BackendTokenSignal<B>,
    clock: C,
    paths: GatePaths,
}

impl<T: Storage, B: Storage, C: Clock> AuthGuard<T, B, C> {
    /// Create a guard over tab storage `tab` and backend token storage `tokens`.
    pub const fn new(tab: T, tokens: B, clock: C, paths: GatePaths) -> Self {
        Self {
            sessions: SessionRecordStore::new(tab),
            backend: BackendTokenSignal::new(tokens),
            clock,
            paths,
        }
    }

    /// Returns `true` if any session signal is live.
    ///
    /// The local record is always checked first so that an expired record
    /// is cleared even when the backend token grants access.
    pub fn is_authenticated(&self) -> bool {
        let now = self.clock.now_millis();
        let signals: [&dyn SessionSignal; 2] = [&self.sessions, &self.backend];

        signals.iter().any(|signal| {
            let valid = signal.is_valid(now);
            if valid {
                tracing::debug!(signal = signal.name(), "session accepted");
            }
            valid
        })
    }

    /// Returns `true` if the local session record alone is live.
    pub fn is_locally_authenticated(&self) -> bool {
        self.sessions.is_valid(self.clock.now_millis())
    }

    /// Gate `current_path`.
    ///
    /// The login page is never gated. For any other path without a live
    /// session the path is saved as the pending redirect target (if it is a
    /// path on this site) and a replacing navigation to the login page is
    /// returned.
    pub fn enforce(&self, current_path: &str) -> Enforcement {
        if self.paths.is_login(current_path) {
            return Enforcement::Exempt;
        }

        if self.is_authenticated() {
            return Enforcement::Allowed;
        }

        if !is_local_path(current_path) {
            tracing::debug!(path = current_path, "not saving off-site redirect target");
        } else if let Err(e) = self.sessions.set_pending_redirect(current_path) {
            tracing::warn!(error = %e, "failed to save pending redirect");
        }
        tracing::debug!(path = current_path, "no live session, redirecting to login");
        Enforcement::Redirect(Navigation::replace(self.paths.login.clone()))
    }

    /// The session store adapter this guard reads.
    pub const fn sessions(&self) -> &SessionRecordStore<T> {
        &self.sessions
    }
}
