//! Dashboard route handler.

use askama::Template;
use axum::{Router, extract::State, response::Html, routing::get};
use lifex_core::{GatePaths, SESSION_DURATION};

use crate::state::AppState;

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub current_path: String,
    pub session_minutes: u64,
    pub using_builtin_password: bool,
    pub persistent_settings: bool,
}

impl DashboardTemplate {
    fn from_state(state: &AppState) -> Self {
        Self {
            current_path: state.config().paths.after_login.clone(),
            session_minutes: SESSION_DURATION.as_secs() / 60,
            using_builtin_password: state.config().uses_builtin_password()
                && state.credentials().is_default(),
            persistent_settings: state.settings().is_persistent(),
        }
    }
}

/// Build the dashboard router.
pub fn router(paths: &GatePaths) -> Router<AppState> {
    Router::new().route(&paths.after_login, get(dashboard))
}

/// Display the admin dashboard.
///
/// GET /admin.html
async fn dashboard(State(state): State<AppState>) -> Html<String> {
    Html(
        DashboardTemplate::from_state(&state)
            .render()
            .unwrap_or_else(|_| String::from("Error rendering template")),
    )
}
