#![deny(missing_docs)]

//! # kithab-session — Session and Token Lifecycle
//!
//! Holds the bearer token for the rest of the workspace and ends the session
//! on its own when the token expires.
//!
//! - [`token`] decodes the JWT `exp` claim (no signature check).
//! - [`store`] persists the token and user ([`MemoryStore`], [`FileStore`]).
//! - [`session`] is the state machine: one [`Session`] per process, passed
//!   explicitly to whoever needs it, owning exactly one expiry timer.
//!
//! ## Crate Policy
//!
//! - No ambient global state; every consumer receives a [`Session`] handle.
//! - Expiry is never retried or refreshed. A dead token means a new login.

pub mod session;
pub mod store;
pub mod token;

pub use session::{
    ActiveSession, Authenticator, LogoutReason, Session, SessionError, SessionState,
};
pub use store::{FileStore, MemoryStore, SessionStore, StoreError, StoredSession};
pub use token::{TokenClaims, TokenError};
