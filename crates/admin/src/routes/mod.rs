//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! # Public
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database, when configured)
//! GET  /                       - Landing page (site index.html)
//! GET  /assets/*               - Static assets
//! GET  /admin-login.html       - Login page
//! POST /admin-login.html       - Login
//! POST /logout                 - Logout
//!
//! # Protected (page gate runs first)
//! GET  /admin.html             - Dashboard
//! GET  /admin-password         - Password change page
//! POST /admin-password         - Change password
//! POST /api/session/refresh    - Activity heartbeat
//! *    anything else           - Static site pages
//! ```

pub mod api;
pub mod auth;
pub mod dashboard;
pub mod settings;

use std::path::Path;

use axum::{Router, extract::State, http::StatusCode, routing::get};
use tower_http::services::{ServeDir, ServeFile};

use crate::middleware::require_admin_session;
use crate::state::AppState;

/// Build the complete router: public routes plus the gated ones.
pub fn routes(state: &AppState) -> Router<AppState> {
    let site_dir = state.config().site_dir.clone();
    let paths = &state.config().paths;

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route_service("/", ServeFile::new(site_dir.join("index.html")))
        .nest_service("/assets", ServeDir::new(site_dir.join("assets")))
        .merge(auth::router(paths))
        .merge(protected(state, &site_dir))
}

/// Routes that require an admin session.
///
/// The gate is a layer on the whole router (fallback included), so no
/// protected handler runs before the check completes.
fn protected(state: &AppState, site_dir: &Path) -> Router<AppState> {
    Router::new()
        .merge(dashboard::router(&state.config().paths))
        .merge(settings::router())
        .merge(api::router())
        .fallback_service(ServeDir::new(site_dir))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_admin_session,
        ))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity when a database is configured.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    let Some(pool) = state.pool() else {
        return StatusCode::OK;
    };
    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
