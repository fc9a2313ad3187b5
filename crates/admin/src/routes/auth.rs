//! Authentication route handlers for admin.
//!
//! Provides the password login form and logout.

use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use lifex_core::{GatePaths, LoginOutcome, Navigation};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;
use crate::middleware::set_cookie;
use crate::storage::{CookieStorage, TabStorage, clear_return_to_cookie};

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub login_path: String,
    pub error: Option<String>,
}

/// Build the auth router.
pub fn router(paths: &GatePaths) -> Router<AppState> {
    Router::new()
        .route(&paths.login, get(login_page).post(login))
        .route("/logout", post(logout))
}

/// Render the login page.
///
/// GET /admin-login.html
async fn login_page(State(state): State<AppState>) -> Html<String> {
    render_login(&state, None)
}

/// Check the password and issue a session.
///
/// POST /admin-login.html
///
/// The stored password is re-read first, so a change made with the CLI
/// applies to the next attempt. Success redirects to the page the gate
/// saved (in the session or the return-to cookie), or the dashboard.
/// A wrong password re-renders the form with 401.
#[instrument(skip(state, session, headers, form))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if let Err(e) = state.reload_credentials().await {
        tracing::warn!(error = %e, "failed to reload admin password, using cached value");
    }

    let cookies = CookieStorage::from_headers(&headers);
    let mut tab = TabStorage::load(&session).await;
    let had_return_to = tab.adopt_return_to(&cookies);
    let outcome = {
        let mut gate = state.page_gate(tab.storage(), cookies);
        gate.login(&form.password)
    };

    match outcome {
        LoginOutcome::Accepted(Navigation { location, .. }) => {
            // New session ID on privilege change
            session.cycle_id().await?;
            tab.save(&session).await?;
            tracing::info!(target_path = %location, "admin logged in");

            let mut response = Redirect::to(&location).into_response();
            if had_return_to {
                set_cookie(&mut response, &clear_return_to_cookie(state.config().is_secure()));
            }
            Ok(response)
        }
        LoginOutcome::Rejected => {
            tab.save(&session).await?;
            Ok((
                StatusCode::UNAUTHORIZED,
                render_login(&state, Some("Incorrect password.".to_string())),
            )
                .into_response())
        }
    }
}

/// Clear the admin session.
///
/// POST /logout
#[instrument(skip(state, session, headers))]
async fn logout(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Result<Redirect, AppError> {
    let tab = TabStorage::load(&session).await;
    let navigation = state
        .page_gate(tab.storage(), CookieStorage::from_headers(&headers))
        .logout();
    tab.save(&session).await?;

    tracing::info!("admin logged out");
    Ok(Redirect::to(&navigation.location))
}

fn render_login(state: &AppState, error: Option<String>) -> Html<String> {
    let template = LoginTemplate {
        login_path: state.config().paths.login.clone(),
        error,
    };
    Html(
        template
            .render()
            .unwrap_or_else(|_| String::from("Error rendering template")),
    )
}
