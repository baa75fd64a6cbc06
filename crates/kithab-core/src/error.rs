//! # Error Types
//!
//! Errors raised while constructing core domain values. Wire-shape problems
//! in metadata are *not* errors: they are recovered by normalization in
//! [`crate::wire`] and never reach this type.

use thiserror::Error;

/// Top-level error type for core domain construction.
#[derive(Error, Debug)]
pub enum KithabError {
    /// An identifier was empty or contained only whitespace.
    #[error("invalid {kind} identifier: {value:?}")]
    InvalidIdentifier {
        /// Which identifier namespace was being constructed.
        kind: &'static str,
        /// The rejected raw value.
        value: String,
    },

    /// A semester value could not be coerced to a positive integer.
    #[error("invalid semester: {0:?}")]
    InvalidSemester(String),

    /// Login was attempted without an id or a password.
    #[error("ID and password required")]
    MissingCredentials,

    /// A timestamp could not be parsed.
    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp {
        /// The rejected input.
        value: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
