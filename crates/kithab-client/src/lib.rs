#![deny(missing_docs)]

//! # kithab-client — Typed HTTP Client for the Notes Portal Backend
//!
//! Thin async wrapper over the portal's REST API. Payloads are normalized into
//! `kithab-core` types on the way in, so nothing above this crate sees the
//! backend's mixed id and semester encodings.
//!
//! ## Usage
//!
//! ```no_run
//! # async fn demo() -> Result<(), kithab_client::ApiError> {
//! use kithab_client::{ApiConfig, KithabClient};
//!
//! let client = KithabClient::new(ApiConfig::new("http://localhost:5000/api")?)?;
//! let snapshot = client.meta().snapshot().await?;
//! println!("{} regulations", snapshot.regulations().len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Every call returns [`ApiError`]. A 401 from any endpoint surfaces as
//! [`ApiError::Unauthorized`]; callers holding a session end it on that.
//! Other failures carry the backend's `message` when it sent one.

pub mod admin;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod meta;
pub mod notes;

pub use admin::AdminClient;
pub use auth::{AuthClient, FORGOT_PASSWORD_INCOMPLETE};
pub use client::KithabClient;
pub use config::{ApiConfig, ConfigError, DEFAULT_TIMEOUT_SECS};
pub use error::ApiError;
pub use meta::{MetaClient, NewBranch, NewRegulation, NewSubject};
pub use notes::{
    FileMeta, NoteFile, NoteTarget, NotesClient, UploadReceipt, FILE_TOO_LARGE, MAX_UPLOAD_BYTES,
    RECENT_UPLOADS,
};
