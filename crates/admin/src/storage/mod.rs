//! Storage backends for the admin gate.
//!
//! The core gate runs against three [`lifex_core::Storage`]s:
//!
//! - [`TabStorage`] - tab-scoped storage kept in the tower-sessions session
//!   (or a cookie, for a visitor without one)
//! - [`CookieStorage`] - read-only view of request cookies (backend auth token)
//! - [`SettingsStorage`] - persistent settings (password override), cached in memory

mod cookies;
mod settings;
mod tab;

pub use cookies::CookieStorage;
pub use settings::SettingsStorage;
pub use tab::{
    RETURN_TO_COOKIE, TAB_STORAGE_KEY, TabStorage, clear_return_to_cookie, return_to_cookie,
};
