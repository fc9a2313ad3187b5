//! Page protection orchestrator.
//!
//! One [`PageGate`] is built per page load, with its storage and clock
//! passed in. The gate check is the first thing that runs; the page's own
//! logic only runs once the gate reaches [`PageState::Allowed`].
//!
//! ```text
//! Unchecked ──on_load──▶ Blocked(login)     (page stops here)
//!     │
//!     └─────on_load──▶ Allowed ──on_activity──▶ Allowed
//! ```
//!
//! Expiry is only noticed by the next page load's check. Nothing polls
//! an open page.

use secrecy::SecretString;

use crate::clock::Clock;
use crate::storage::Storage;
use crate::types::CredentialError;

use super::credentials::{CredentialManager, Credentials};
use super::guard::{AuthGuard, Enforcement};
use super::navigation::{GatePaths, Navigation};

/// Where a page load stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    /// The gate has not run yet.
    Unchecked,
    /// The page may be produced.
    Allowed,
    /// The page must not be produced; navigate away instead.
    Blocked(Navigation),
}

/// Result of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Session issued; continue to the saved target.
    Accepted(Navigation),
    /// Wrong password.
    Rejected,
}

/// Per-page-load gate.
///
/// - `T`: tab-scoped storage (session record, pending redirect)
/// - `B`: storage holding the hosted backend's token (read only)
/// - `K`: persistent storage holding the password override
/// - `C`: clock
#[derive(Debug)]
pub struct PageGate<T, B, K, C> {
    guard: AuthGuard<T, B, C>,
    manager: CredentialManager<T, K, C>,
    paths: GatePaths,
    state: PageState,
}

impl<T, B, K, C> PageGate<T, B, K, C>
where
    T: Storage + Clone,
    B: Storage,
    K: Storage,
    C: Clock + Clone,
{
    /// Build the gate for one page load.
    pub fn new(tab: T, tokens: B, credentials: Credentials<K>, clock: C, paths: GatePaths) -> Self {
        let manager =
            CredentialManager::new(tab.clone(), credentials, clock.clone(), paths.landing.clone());
        Self {
            guard: AuthGuard::new(tab, tokens, clock, paths.clone()),
            manager,
            paths,
            state: PageState::Unchecked,
        }
    }

    /// Build the gate with the default admin password.
    pub fn with_default_password(tab: T, tokens: B, credentials: K, clock: C) -> Self {
        Self::new(tab, tokens, Credentials::new(credentials), clock, GatePaths::default())
    }

    /// Run the gate for `path`.
    ///
    /// Only the first call per load has any effect; later calls return the
    /// state reached by the first, so a load issues at most one redirect.
    pub fn on_load(&mut self, path: &str) -> &PageState {
        if self.state != PageState::Unchecked {
            return &self.state;
        }

        self.state = match self.guard.enforce(path) {
            Enforcement::Exempt => PageState::Allowed,
            Enforcement::Allowed => {
                self.manager.refresh_session();
                PageState::Allowed
            }
            Enforcement::Redirect(navigation) => PageState::Blocked(navigation),
        };
        &self.state
    }

    /// Record user activity on an allowed page, sliding the session window.
    ///
    /// Returns `true` if the session was refreshed.
    pub fn on_activity(&self) -> bool {
        self.state == PageState::Allowed && self.manager.refresh_session()
    }

    /// Attempt a login from the login page.
    ///
    /// On success the pending redirect target is consumed; without one the
    /// default admin page is used.
    pub fn login(&mut self, password: &str) -> LoginOutcome {
        if !self.manager.login(password) {
            return LoginOutcome::Rejected;
        }

        self.state = PageState::Allowed;
        let target = self
            .manager
            .sessions()
            .take_pending_redirect()
            .unwrap_or_else(|| self.paths.after_login.clone());
        LoginOutcome::Accepted(Navigation::push(target))
    }

    /// Log out and return the navigation to the landing page.
    pub fn logout(&mut self) -> Navigation {
        let navigation = self.manager.logout();
        self.state = PageState::Blocked(navigation.clone());
        navigation
    }

    /// Change the admin password.
    ///
    /// # Errors
    ///
    /// See [`Credentials::change`].
    pub fn change_credential(&self, new_password: &str) -> Result<(), CredentialError> {
        self.manager.change_credential(new_password)
    }

    /// The password currently in force.
    pub fn current_credential(&self) -> SecretString {
        self.manager.get_current_credential()
    }

    /// Returns `true` if any session signal is live.
    pub fn is_authenticated(&self) -> bool {
        self.guard.is_authenticated()
    }

    /// Current state.
    pub const fn state(&self) -> &PageState {
        &self.state
    }
}
