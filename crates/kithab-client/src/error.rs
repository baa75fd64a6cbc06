//! Portal API client error types.

use reqwest::StatusCode;

/// Errors from portal API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        /// Endpoint being called.
        endpoint: String,
        /// Transport error.
        source: reqwest::Error,
    },

    /// The backend rejected the bearer token (HTTP 401).
    #[error("{message}")]
    Unauthorized {
        /// Endpoint being called.
        endpoint: String,
        /// Server message, or a default.
        message: String,
    },

    /// The backend returned another non-2xx status. `message` is the body's
    /// `message` field when present.
    #[error("{message}")]
    Status {
        /// Endpoint being called.
        endpoint: String,
        /// HTTP status.
        status: u16,
        /// Server message, or a status-derived fallback.
        message: String,
    },

    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        /// Endpoint being called.
        endpoint: String,
        /// Decoder error.
        source: serde_json::Error,
    },

    /// A response was well-formed JSON but lacked a required field.
    #[error("response from {endpoint} is missing {field}")]
    MissingField {
        /// Endpoint being called.
        endpoint: String,
        /// What was expected.
        field: &'static str,
    },

    /// An authenticated call was attempted without a token.
    #[error("not logged in")]
    NotAuthenticated,

    /// The request was rejected locally before any network call.
    #[error("{0}")]
    Rejected(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl ApiError {
    /// Whether the session should be ended because of this error.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// The HTTP status, for server-side failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED.as_u16()),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
