//! Integration tests for the admin page gate.
//!
//! Drives the full router (session layer, gate, handlers, static pages)
//! in-process. Run with: cargo test -p lifex-integration-tests

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::http::StatusCode;
use lifex_admin::config::AdminConfig;
use lifex_admin::middleware::SESSION_COOKIE_NAME;
use lifex_admin::storage::RETURN_TO_COOKIE;
use lifex_integration_tests::TestApp;
use secrecy::SecretString;

const MINUTE: Duration = Duration::from_secs(60);
const LOGIN: &str = "/admin-login.html";

fn backend_token_cookie(access_token: &str, expires_at_secs: i64) -> String {
    let json = serde_json::json!({
        "access_token": access_token,
        "expires_at": expires_at_secs,
    });
    urlencoding::encode(&json.to_string()).into_owned()
}

// ============================================================================
// Public routes
// ============================================================================

#[tokio::test]
async fn test_public_routes_need_no_session() {
    let app = TestApp::new();
    let mut browser = app.browser();

    let health = browser.get("/health").await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body, "ok");

    assert_eq!(browser.get("/health/ready").await.status, StatusCode::OK);

    let landing = browser.get("/").await;
    assert_eq!(landing.status, StatusCode::OK);
    assert!(landing.body.contains("LIFE X"));

    assert_eq!(browser.get("/assets/admin.css").await.status, StatusCode::OK);

    let login = browser.get(LOGIN).await;
    assert_eq!(login.status, StatusCode::OK);
    assert!(login.body.contains(r#"name="password""#));
}

#[tokio::test]
async fn test_anonymous_public_requests_do_not_create_sessions() {
    let app = TestApp::new();
    let mut browser = app.browser();

    browser.get("/").await;
    browser.get(LOGIN).await;
    assert!(!browser.has_cookie(SESSION_COOKIE_NAME));
}

#[tokio::test]
async fn test_blocked_anonymous_requests_do_not_create_sessions() {
    let app = TestApp::new();
    let mut browser = app.browser();

    for path in ["/admin.html", "/reports.html", "/admin-password"] {
        assert_eq!(browser.get(path).await.status, StatusCode::SEE_OTHER);
    }
    browser.post("/api/session/refresh").await;
    assert!(!browser.has_cookie(SESSION_COOKIE_NAME));
    assert!(browser.has_cookie(RETURN_TO_COOKIE));

    let response = browser.login("admin123").await;
    assert_eq!(response.location(), Some("/admin-password"));
    assert!(browser.has_cookie(SESSION_COOKIE_NAME));
    assert!(!browser.has_cookie(RETURN_TO_COOKIE));
}

#[tokio::test]
async fn test_failed_login_keeps_return_target() {
    let app = TestApp::new();
    let mut browser = app.browser();

    browser.get("/reports.html").await;
    assert_eq!(
        browser.login("wrong-password").await.status,
        StatusCode::UNAUTHORIZED
    );
    assert!(!browser.has_cookie(SESSION_COOKIE_NAME));

    let response = browser.login("admin123").await;
    assert_eq!(response.location(), Some("/reports.html"));
}

// ============================================================================
// Gate
// ============================================================================

#[tokio::test]
async fn test_unauthenticated_page_redirects_to_login() {
    let app = TestApp::new();
    let mut browser = app.browser();

    let response = browser.get("/admin.html").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some(LOGIN));
    assert_eq!(response.cache_control(), Some("no-store"));
    assert!(!response.body.contains("Dashboard"));
}

#[tokio::test]
async fn test_static_site_pages_are_gated() {
    let app = TestApp::new();
    let mut browser = app.browser();

    let response = browser.get("/reports.html").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert!(!response.body.contains("Monthly reports"));

    browser.login("admin123").await;
    let response = browser.get("/reports.html").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Monthly reports"));
}

#[tokio::test]
async fn test_unauthenticated_api_is_401() {
    let app = TestApp::new();
    let mut browser = app.browser();

    let response = browser.post("/api/session/refresh").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.location().is_none());
    assert!(response.body.is_empty());
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_returns_to_requested_page() {
    let app = TestApp::new();
    let mut browser = app.browser();

    browser.get("/reports.html?month=2026-01").await;
    let response = browser.login("admin123").await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/reports.html?month=2026-01"));
}

#[tokio::test]
async fn test_login_without_pending_target_goes_to_dashboard() {
    let app = TestApp::new();
    let mut browser = app.browser();

    let response = browser.login("admin123").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/admin.html"));

    let dashboard = browser.get("/admin.html").await;
    assert_eq!(dashboard.status, StatusCode::OK);
    assert!(dashboard.body.contains("Dashboard"));
    assert!(dashboard.body.contains("default password"));
}

#[tokio::test]
async fn test_pending_target_is_used_once() {
    let app = TestApp::new();
    let mut browser = app.browser();

    browser.get("/reports.html").await;
    browser.login("admin123").await;
    browser.post("/logout").await;

    let response = browser.login("admin123").await;
    assert_eq!(response.location(), Some("/admin.html"));
}

#[tokio::test]
async fn test_blocked_api_call_keeps_pending_target() {
    let app = TestApp::new();
    let mut browser = app.browser();

    browser.get("/reports.html").await;
    assert_eq!(
        browser.post("/api/session/refresh").await.status,
        StatusCode::UNAUTHORIZED
    );

    let response = browser.login("admin123").await;
    assert_eq!(response.location(), Some("/reports.html"));
}

#[tokio::test]
async fn test_login_never_redirects_off_site() {
    let app = TestApp::new();

    for path in ["//evil.example/phish", "/\\evil.example/phish"] {
        let mut browser = app.browser();
        let blocked = browser.get(path).await;
        assert_eq!(blocked.status, StatusCode::SEE_OTHER);
        assert_eq!(blocked.location(), Some(LOGIN));

        let response = browser.login("admin123").await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
        assert_eq!(response.location(), Some("/admin.html"), "after {path}");
    }
}

#[tokio::test]
async fn test_off_site_request_keeps_pending_target() {
    let app = TestApp::new();
    let mut browser = app.browser();

    browser.get("/reports.html").await;
    browser.get("//evil.example/phish").await;

    let response = browser.login("admin123").await;
    assert_eq!(response.location(), Some("/reports.html"));
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let app = TestApp::new();
    let mut browser = app.browser();

    let response = browser.login("wrong-password").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.body.contains("Incorrect password"));

    assert_eq!(
        browser.get("/admin.html").await.status,
        StatusCode::SEE_OTHER
    );
}

#[tokio::test]
async fn test_configured_default_password() {
    let app = TestApp::with_config(AdminConfig {
        default_password: SecretString::from("deploy-secret"),
        ..AdminConfig::default()
    });
    let mut browser = app.browser();

    assert_eq!(
        browser.login("admin123").await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        browser.login("deploy-secret").await.status,
        StatusCode::SEE_OTHER
    );
}

#[tokio::test]
async fn test_sessions_are_per_browser() {
    let app = TestApp::new();
    let mut first = app.browser();
    let mut second = app.browser();

    first.login("admin123").await;
    assert_eq!(first.get("/admin.html").await.status, StatusCode::OK);
    assert_eq!(
        second.get("/admin.html").await.status,
        StatusCode::SEE_OTHER
    );
}

// ============================================================================
// Expiry
// ============================================================================

#[tokio::test]
async fn test_session_expires_after_thirty_minutes_idle() {
    let app = TestApp::new();
    let mut browser = app.browser();

    browser.login("admin123").await;
    app.advance(31 * MINUTE);

    let response = browser.get("/admin.html").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some(LOGIN));
}

#[tokio::test]
async fn test_session_valid_at_exactly_thirty_minutes() {
    let app = TestApp::new();
    let mut browser = app.browser();

    browser.login("admin123").await;
    app.advance(30 * MINUTE);

    assert_eq!(browser.get("/admin.html").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_page_loads_slide_the_window() {
    let app = TestApp::new();
    let mut browser = app.browser();

    browser.login("admin123").await;
    app.advance(29 * MINUTE);
    assert_eq!(browser.get("/admin.html").await.status, StatusCode::OK);

    app.advance(29 * MINUTE);
    assert_eq!(browser.get("/admin.html").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_heartbeat_slides_the_window() {
    let app = TestApp::new();
    let mut browser = app.browser();

    browser.login("admin123").await;
    app.advance(20 * MINUTE);
    assert_eq!(
        browser.post("/api/session/refresh").await.status,
        StatusCode::NO_CONTENT
    );

    app.advance(20 * MINUTE);
    assert_eq!(browser.get("/admin.html").await.status, StatusCode::OK);

    app.advance(31 * MINUTE);
    assert_eq!(
        browser.post("/api/session/refresh").await.status,
        StatusCode::UNAUTHORIZED
    );
}

// ============================================================================
// Backend token
// ============================================================================

#[tokio::test]
async fn test_valid_backend_token_grants_access() {
    let app = TestApp::new();
    let mut browser = app.browser();

    let expires_at = app.now_millis() / 1000 + 3600;
    browser.set_cookie(
        "sb-lifex-auth-token",
        &backend_token_cookie("jwt-token", expires_at),
    );

    assert_eq!(browser.get("/admin.html").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_expired_backend_token_is_ignored() {
    let app = TestApp::new();
    let mut browser = app.browser();

    let expires_at = app.now_millis() / 1000 - 1;
    browser.set_cookie(
        "sb-lifex-auth-token",
        &backend_token_cookie("jwt-token", expires_at),
    );

    assert_eq!(
        browser.get("/admin.html").await.status,
        StatusCode::SEE_OTHER
    );
}

// ============================================================================
// Password change
// ============================================================================

#[tokio::test]
async fn test_password_page_is_gated() {
    let app = TestApp::new();
    let mut browser = app.browser();

    assert_eq!(
        browser.get("/admin-password").await.status,
        StatusCode::SEE_OTHER
    );
    assert_eq!(
        browser
            .post_form(
                "/admin-password",
                &[("new_password", "abcdef"), ("confirm_password", "abcdef")],
            )
            .await
            .status,
        StatusCode::SEE_OTHER
    );
    assert_eq!(
        browser.login("admin123").await.status,
        StatusCode::SEE_OTHER
    );
}

#[tokio::test]
async fn test_password_change() {
    let app = TestApp::new();
    let mut browser = app.browser();
    browser.login("admin123").await;

    let short = browser
        .post_form(
            "/admin-password",
            &[("new_password", "abc"), ("confirm_password", "abc")],
        )
        .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);
    assert!(short.body.contains("at least 6 characters"));

    let mismatch = browser
        .post_form(
            "/admin-password",
            &[("new_password", "abcdef"), ("confirm_password", "abcdeg")],
        )
        .await;
    assert_eq!(mismatch.status, StatusCode::BAD_REQUEST);

    let changed = browser
        .post_form(
            "/admin-password",
            &[("new_password", "abcdef"), ("confirm_password", "abcdef")],
        )
        .await;
    assert_eq!(changed.status, StatusCode::OK);
    assert!(changed.body.contains("Password updated"));

    // The current session survives the change
    assert_eq!(browser.get("/admin.html").await.status, StatusCode::OK);

    let mut other = app.browser();
    assert_eq!(
        other.login("admin123").await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(other.login("abcdef").await.status, StatusCode::SEE_OTHER);
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn test_logout_goes_to_landing_and_locks() {
    let app = TestApp::new();
    let mut browser = app.browser();
    browser.login("admin123").await;

    let response = browser.post("/logout").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/"));

    assert_eq!(
        browser.get("/admin.html").await.status,
        StatusCode::SEE_OTHER
    );
}

#[tokio::test]
async fn test_logout_without_session() {
    let app = TestApp::new();
    let mut browser = app.browser();

    let response = browser.post("/logout").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/"));
}

// ============================================================================
// Headers
// ============================================================================

#[tokio::test]
async fn test_security_headers() {
    let app = TestApp::new();
    let mut browser = app.browser();
    browser.login("admin123").await;

    let response = browser.get("/admin.html").await;
    assert_eq!(response.headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(
        response.headers.get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.cache_control(), Some("no-store"));
}
