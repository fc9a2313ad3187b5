//! API route handlers for admin.
//!
//! JSON endpoints used by the admin pages. Every route here sits behind the
//! page gate, which answers 401 instead of redirecting.

pub mod session;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router.
pub fn router() -> Router<AppState> {
    Router::new().merge(session::router())
}
