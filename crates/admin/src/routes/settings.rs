//! Admin password settings routes.

use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use lifex_core::{AdminPassword, CredentialError};
use serde::Deserialize;
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// Password change form data.
#[derive(Deserialize)]
pub struct PasswordForm {
    pub new_password: String,
    pub confirm_password: String,
}

impl std::fmt::Debug for PasswordForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordForm { .. }")
    }
}

/// Password settings page template.
#[derive(Template)]
#[template(path = "settings/password.html")]
pub struct PasswordTemplate {
    pub current_path: String,
    pub min_length: usize,
    pub persistent_settings: bool,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

impl PasswordTemplate {
    fn new(state: &AppState) -> Self {
        Self {
            current_path: "/admin-password".to_string(),
            min_length: AdminPassword::MIN_LENGTH,
            persistent_settings: state.settings().is_persistent(),
            success_message: None,
            error_message: None,
        }
    }

    fn into_html(self) -> Html<String> {
        Html(
            self.render()
                .unwrap_or_else(|_| String::from("Error rendering template")),
        )
    }
}

/// Build the settings router.
pub fn router() -> Router<AppState> {
    Router::new().route("/admin-password", get(password_page).post(change_password))
}

/// Display the password change form.
///
/// GET /admin-password
async fn password_page(State(state): State<AppState>) -> Html<String> {
    PasswordTemplate::new(&state).into_html()
}

/// Change the admin password.
///
/// POST /admin-password
///
/// Existing sessions stay valid; the new password applies to the next login.
#[instrument(skip(state, form))]
async fn change_password(
    State(state): State<AppState>,
    Form(form): Form<PasswordForm>,
) -> Result<Response, AppError> {
    let page = PasswordTemplate::new(&state);

    if form.new_password != form.confirm_password {
        return Ok(rejected(page, "Passwords do not match."));
    }

    match state.credentials().change(&form.new_password) {
        Ok(()) => {}
        Err(e @ CredentialError::TooShort { .. }) => {
            return Ok(rejected(page, &e.to_string()));
        }
        Err(e) => return Err(e.into()),
    }
    state.flush_settings().await?;

    Ok(PasswordTemplate {
        success_message: Some("Password updated.".to_string()),
        ..page
    }
    .into_html()
    .into_response())
}

fn rejected(page: PasswordTemplate, message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        PasswordTemplate {
            error_message: Some(message.to_string()),
            ..page
        }
        .into_html(),
    )
        .into_response()
}
