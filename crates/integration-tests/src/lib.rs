//! Integration tests for the LIFE X admin site.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p lifex-integration-tests
//! ```
//!
//! The admin router is driven in-process with an in-memory session store,
//! in-memory settings and a manual clock, so no database or server is needed.
//! Static pages are served from `fixtures/site`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, Response, StatusCode};
use lifex_admin::config::AdminConfig;
use lifex_admin::middleware::create_session_layer;
use lifex_admin::state::AppState;
use lifex_admin::storage::SettingsStorage;
use lifex_core::ManualClock;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

/// Arbitrary fixed start time (epoch milliseconds).
pub const START_MS: i64 = 1_767_225_600_000;

/// Directory holding the static site used by the tests.
#[must_use]
pub fn site_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/site")
}

/// A response with its body already collected.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The `Location` header, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(axum::http::header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// The `Cache-Control` header, if any.
    #[must_use]
    pub fn cache_control(&self) -> Option<&str> {
        self.headers
            .get(axum::http::header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
    }
}

/// The admin app running in-process with a manual clock.
pub struct TestApp {
    router: Router,
    clock: Arc<ManualClock>,
    state: AppState,
}

impl TestApp {
    /// Build the app with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(AdminConfig::default())
    }

    /// Build the app with `config`; the site directory is always the fixtures.
    #[must_use]
    pub fn with_config(config: AdminConfig) -> Self {
        let config = AdminConfig {
            site_dir: site_dir(),
            ..config
        };
        let clock = Arc::new(ManualClock::new(START_MS));
        let session_layer = create_session_layer(MemoryStore::default(), &config);
        let state = AppState::with_clock(
            config,
            None,
            SettingsStorage::in_memory(),
            Arc::clone(&clock) as Arc<dyn lifex_core::Clock>,
        );
        let router = lifex_admin::app(state.clone(), session_layer);

        Self {
            router,
            clock,
            state,
        }
    }

    /// Move the app's clock forward.
    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    /// Current app time in epoch milliseconds.
    #[must_use]
    pub fn now_millis(&self) -> i64 {
        lifex_core::Clock::now_millis(&*self.clock)
    }

    /// Shared application state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Open a new browser with an empty cookie jar.
    #[must_use]
    pub fn browser(&self) -> TestBrowser<'_> {
        TestBrowser {
            app: self,
            cookies: BTreeMap::new(),
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// A cookie-keeping client for [`TestApp`].
///
/// Two browsers over the same app behave like two separate browser sessions.
pub struct TestBrowser<'a> {
    app: &'a TestApp,
    cookies: BTreeMap<String, String>,
}

impl TestBrowser<'_> {
    /// Set a cookie as if another script on the site had written it.
    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_owned(), value.to_owned());
    }

    /// Returns `true` if the jar holds `name`.
    #[must_use]
    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    /// `GET path`.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None).await
    }

    /// `POST path` with an empty body.
    pub async fn post(&mut self, path: &str) -> TestResponse {
        self.send(Method::POST, path, None).await
    }

    /// `POST path` with a url-encoded form.
    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        self.send(Method::POST, path, Some(body)).await
    }

    /// Submit the login form.
    pub async fn login(&mut self, password: &str) -> TestResponse {
        self.post_form("/admin-login.html", &[("password", password)])
            .await
    }

    async fn send(&mut self, method: Method, path: &str, form: Option<String>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if !self.cookies.is_empty() {
            let header = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(COOKIE, header);
        }
        let body = match form {
            Some(form) => {
                builder = builder.header(CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(form)
            }
            None => Body::empty(),
        };

        let Ok(request) = builder.body(body) else {
            panic!("invalid test request for {path}");
        };
        let Ok(response) = self.app.router.clone().oneshot(request).await;
        self.collect(response).await
    }

    async fn collect(&mut self, response: Response<Body>) -> TestResponse {
        for set_cookie in response.headers().get_all(SET_COOKIE) {
            let Ok(set_cookie) = set_cookie.to_str() else {
                continue;
            };
            let pair = set_cookie.split(';').next().unwrap_or_default();
            if let Some((name, value)) = pair.split_once('=') {
                let expired = set_cookie.to_ascii_lowercase().contains("max-age=0");
                if expired {
                    self.cookies.remove(name.trim());
                } else {
                    self.cookies
                        .insert(name.trim().to_owned(), value.trim().to_owned());
                }
            }
        }

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}
