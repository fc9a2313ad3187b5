//! Page locations the gate navigates between.

/// Where the gate sends the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Target path (may include a query string).
    pub location: String,
    /// Replace the current history entry instead of pushing a new one, so
    /// back-navigation cannot return to the page that issued it.
    pub replace: bool,
}

impl Navigation {
    /// A navigation that adds a history entry.
    #[must_use]
    pub fn push(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            replace: false,
        }
    }

    /// A navigation that replaces the current history entry.
    #[must_use]
    pub fn replace(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            replace: true,
        }
    }
}

/// Fixed page paths of the admin site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatePaths {
    /// The login page. Never gated.
    pub login: String,
    /// Public landing page shown after logout.
    pub landing: String,
    /// Where a login goes when no redirect target is pending.
    pub after_login: String,
}

impl Default for GatePaths {
    fn default() -> Self {
        Self {
            login: "/admin-login.html".to_owned(),
            landing: "/".to_owned(),
            after_login: "/admin.html".to_owned(),
        }
    }
}

impl GatePaths {
    /// Returns `true` if `path` (query string ignored) is the login page.
    #[must_use]
    pub fn is_login(&self, path: &str) -> bool {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        path == self.login
    }
}

/// Returns `true` if `target` is a path on this site.
///
/// Browsers read `//host` and `/\host` as links to another host, so only a
/// single leading `/` counts.
#[must_use]
pub fn is_local_path(target: &str) -> bool {
    let mut chars = target.chars();
    chars.next() == Some('/') && !matches!(chars.next(), Some('/' | '\\'))
}
