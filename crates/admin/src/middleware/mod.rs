//! HTTP middleware stack for admin.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions, `PostgreSQL` or in-memory store)
//! 4. Security headers
//! 5. Page gate (protected routes and the static site fallback only)

pub mod auth;
pub mod security_headers;
pub mod session;

pub use auth::{AdminAuthRejection, require_admin_session, set_cookie};
pub use security_headers::security_headers_middleware;
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
