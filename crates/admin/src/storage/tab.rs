//! Tab-scoped storage kept inside the tower-sessions session.
//!
//! The whole map is stored under one session key, so the legacy key names
//! (`lifex_admin_session`, `redirect_after_login`) survive unchanged inside it.
//!
//! A visitor without a session whose only stored item is the pending
//! redirect target gets it back as the [`RETURN_TO_COOKIE`] cookie instead,
//! so blocked anonymous requests never create server-side sessions.

use std::collections::BTreeMap;

use lifex_core::{MemoryStorage, Storage, keys};
use tower_sessions::Session;
use tower_sessions::cookie::{Cookie, SameSite};

use super::CookieStorage;

/// Session key holding the tab storage map.
pub const TAB_STORAGE_KEY: &str = "tab_storage";

/// Cookie holding the pending redirect target of a visitor without a session.
pub const RETURN_TO_COOKIE: &str = "lifex_return_to";

/// Browser-session cookie carrying `target`.
#[must_use]
pub fn return_to_cookie(target: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((RETURN_TO_COOKIE, urlencoding::encode(target).into_owned()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .build()
}

/// Cookie that removes [`RETURN_TO_COOKIE`].
#[must_use]
pub fn clear_return_to_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((RETURN_TO_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .removal()
        .build()
}

/// Snapshot of a request's tab storage.
///
/// Load it before running the gate, then [`save`](Self::save) it before the
/// response is sent.
#[derive(Debug)]
pub struct TabStorage {
    storage: MemoryStorage,
    loaded: BTreeMap<String, String>,
}

impl TabStorage {
    /// Load the snapshot from `session`.
    ///
    /// A session that cannot be read yields empty storage.
    pub async fn load(session: &Session) -> Self {
        let loaded = match session
            .get::<BTreeMap<String, String>>(TAB_STORAGE_KEY)
            .await
        {
            Ok(items) => items.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load tab storage, starting empty");
                BTreeMap::new()
            }
        };

        Self {
            storage: MemoryStorage::from_snapshot(loaded.clone()),
            loaded,
        }
    }

    /// The storage the gate reads and writes.
    #[must_use]
    pub const fn storage(&self) -> &MemoryStorage {
        &self.storage
    }

    /// Returns `true` if the storage differs from what was loaded.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.storage.snapshot() != self.loaded
    }

    /// Take the pending redirect target from the [`RETURN_TO_COOKIE`] cookie
    /// unless the session already holds one.
    ///
    /// The adopted target counts as loaded, so it alone never makes the
    /// storage dirty. Returns `true` if the cookie was present.
    pub fn adopt_return_to(&mut self, cookies: &CookieStorage) -> bool {
        let Some(target) = cookies.get_item(RETURN_TO_COOKIE).ok().flatten() else {
            return false;
        };
        if !self.loaded.contains_key(keys::REDIRECT_AFTER_LOGIN) {
            self.loaded
                .insert(keys::REDIRECT_AFTER_LOGIN.to_owned(), target.clone());
            if let Err(e) = self.storage.set_item(keys::REDIRECT_AFTER_LOGIN, target) {
                tracing::warn!(error = %e, "failed to adopt pending redirect");
            }
        }
        true
    }

    /// The pending redirect target, when it is all that a visitor without
    /// a session has stored. Such a target belongs in [`return_to_cookie`]
    /// rather than a new session.
    #[must_use]
    pub fn anonymous_return_to(&self, session: &Session) -> Option<String> {
        if session.id().is_some() || !self.loaded.is_empty() {
            return None;
        }
        let mut items = self.storage.snapshot();
        let target = items.remove(keys::REDIRECT_AFTER_LOGIN)?;
        items.is_empty().then_some(target)
    }

    /// Write changes back to `session`. Untouched storage is not written,
    /// so anonymous requests that change nothing do not create sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn save(&self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        let items = self.storage.snapshot();
        if items == self.loaded {
            return Ok(());
        }

        if items.is_empty() {
            session
                .remove::<BTreeMap<String, String>>(TAB_STORAGE_KEY)
                .await?;
        } else {
            session.insert(TAB_STORAGE_KEY, items).await?;
        }
        Ok(())
    }
}
