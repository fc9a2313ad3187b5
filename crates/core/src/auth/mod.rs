//! Admin authentication.
//!
//! # Components
//!
//! - [`SessionRecordStore`] - reads/writes the session record in tab storage
//! - [`AuthGuard`] - decides whether a page may be produced
//! - [`Credentials`] / [`CredentialManager`] - password, login, logout, refresh
//! - [`PageGate`] - per-page-load state machine tying the above together
//!
//! Access is granted by either of two [`SessionSignal`]s: the local session
//! record, or the hosted backend's auth token.

mod credentials;
mod gate;
mod guard;
mod navigation;
mod session_store;
mod signal;

pub use credentials::{CredentialManager, Credentials};
pub use gate::{LoginOutcome, PageGate, PageState};
pub use guard::{AuthGuard, Enforcement};
pub use navigation::{GatePaths, Navigation, is_local_path};
pub use session_store::SessionRecordStore;
pub use signal::{BackendTokenSignal, SessionSignal};
