//! Core types for LIFE X.
//!
//! This module provides type-safe wrappers for the values the admin gate
//! keeps in browser-style storage.

pub mod credential;
pub mod keys;
pub mod session;
pub mod token;

pub use credential::{AdminPassword, CredentialError, DEFAULT_PASSWORD};
pub use session::{SESSION_DURATION, SessionRecord};
pub use token::BackendAuthToken;
