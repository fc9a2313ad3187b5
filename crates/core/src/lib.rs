//! LIFE X Core - Admin session guard library.
//!
//! This crate holds the authentication rules shared by every LIFE X component:
//! - `admin` - HTTP server that gates the admin pages
//! - `cli` - Command-line tools for migrations and password management
//!
//! # Architecture
//!
//! The core crate is synchronous and performs no I/O of its own. All state
//! lives behind the [`Storage`] trait, so the same rules run against an
//! in-memory map in tests and against session/cookie/database backed
//! storage in the server.
//!
//! # Modules
//!
//! - [`types`] - Session record, admin password and backend token types
//! - [`storage`] - Key/value storage abstraction and the in-memory store
//! - [`clock`] - Millisecond clock abstraction
//! - [`auth`] - Session store adapter, auth guard, credential manager and page gate

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod clock;
pub mod storage;
pub mod types;

pub use auth::{
    AuthGuard, BackendTokenSignal, CredentialManager, Credentials, Enforcement, GatePaths,
    LoginOutcome, Navigation, PageGate, PageState, SessionRecordStore, SessionSignal,
    is_local_path,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use storage::{MemoryStorage, Storage, StorageError};
pub use types::*;
