//! Session activity endpoint.

use axum::{Router, http::StatusCode, routing::post};

use crate::state::AppState;

/// Build the session API router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/session/refresh", post(refresh))
}

/// Activity heartbeat.
///
/// POST /api/session/refresh
///
/// The gate already slid the session window forward before this runs, and
/// answered 401 if the session had expired.
async fn refresh() -> StatusCode {
    StatusCode::NO_CONTENT
}
