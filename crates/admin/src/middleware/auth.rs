//! Page gate middleware for admin.
//!
//! Runs the session check before any protected handler. Handlers behind
//! this layer only run once the gate reaches [`PageState::Allowed`].

use axum::{
    extract::{Request, State},
    http::{
        HeaderValue, StatusCode,
        header::{CACHE_CONTROL, SET_COOKIE},
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use lifex_core::{MemoryStorage, PageState, Storage, keys};
use tower_sessions::Session;
use tower_sessions::cookie::Cookie;

use crate::error::AppError;
use crate::state::AppState;
use crate::storage::{CookieStorage, TabStorage, return_to_cookie};

/// Response for a request the gate did not let through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAuthRejection {
    /// Redirect to the login page (for HTML requests).
    RedirectToLogin(String),
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl AdminAuthRejection {
    /// Pick the rejection for a blocked request to `path`.
    #[must_use]
    pub fn for_path(path: &str, login: &str) -> Self {
        if is_api(path) {
            Self::Unauthorized
        } else {
            Self::RedirectToLogin(login.to_owned())
        }
    }
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(location) => (
                [(CACHE_CONTROL, HeaderValue::from_static("no-store"))],
                Redirect::to(&location),
            )
                .into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

/// Require a live admin session.
///
/// Loads the tab storage from the session, runs the gate for the requested
/// path and saves the storage back before deciding. Allowed requests have
/// their session window slid forward. A blocked visitor without a session
/// gets the redirect target as a cookie instead of a new session.
pub async fn require_admin_session(
    State(state): State<AppState>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    let target = request
        .uri()
        .path_and_query()
        .map_or_else(|| path.clone(), ToString::to_string);

    let tab = TabStorage::load(&session).await;
    let page_state = {
        let pending = pending_redirect(tab.storage());
        let mut gate = state.page_gate(tab.storage(), CookieStorage::from_headers(request.headers()));
        let page_state = gate.on_load(&target).clone();

        // API calls are not pages a login should return to.
        if is_api(&path) && matches!(page_state, PageState::Blocked(_)) {
            restore_pending_redirect(tab.storage(), pending);
        }
        page_state
    };

    let return_to = match &page_state {
        PageState::Blocked(_) => tab.anonymous_return_to(&session),
        _ => None,
    };
    let saved = match return_to {
        Some(_) => Ok(()),
        None => tab.save(&session).await,
    };
    if let Err(e) = saved {
        return AppError::from(e).into_response();
    }

    match page_state {
        PageState::Allowed => next.run(request).await,
        PageState::Blocked(navigation) => {
            tracing::debug!(path = %path, "blocked request without admin session");
            let mut response = AdminAuthRejection::for_path(&path, &navigation.location).into_response();
            if let Some(target) = return_to {
                let cookie = return_to_cookie(&target, state.config().is_secure());
                set_cookie(&mut response, &cookie);
            }
            response
        }
        PageState::Unchecked => AdminAuthRejection::Unauthorized.into_response(),
    }
}

/// Append `cookie` to the response's `Set-Cookie` headers.
pub fn set_cookie(response: &mut Response, cookie: &Cookie<'_>) {
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => tracing::warn!(cookie = cookie.name(), error = %e, "invalid cookie value"),
    }
}

fn is_api(path: &str) -> bool {
    path.starts_with("/api/")
}

fn pending_redirect(tab: &MemoryStorage) -> Option<String> {
    tab.get_item(keys::REDIRECT_AFTER_LOGIN).ok().flatten()
}

fn restore_pending_redirect(tab: &MemoryStorage, pending: Option<String>) {
    let restored = match pending {
        Some(target) => tab.set_item(keys::REDIRECT_AFTER_LOGIN, target),
        None => tab.remove_item(keys::REDIRECT_AFTER_LOGIN),
    };
    if let Err(e) = restored {
        tracing::warn!(error = %e, "failed to restore pending redirect");
    }
}
