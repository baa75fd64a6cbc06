//! Backend connection settings.

use url::Url;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors, raised at construction.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The base URL did not parse.
    #[error("invalid backend URL {url:?}: {source}")]
    InvalidUrl {
        /// The rejected input.
        url: String,
        /// Parser error.
        source: url::ParseError,
    },

    /// The base URL is not http(s).
    #[error("backend URL must be http or https, got scheme {0:?}")]
    UnsupportedScheme(String),

    /// A zero timeout.
    #[error("timeout must be at least one second")]
    ZeroTimeout,
}

/// Where the backend lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Backend root. Always ends with `/` so relative paths join beneath it.
    pub base_url: Url,
    /// Login id that is routed to the admin login endpoint.
    pub admin_id: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Parse and validate `base_url`. Trailing slashes are normalized.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim();
        let mut url = Url::parse(trimmed).map_err(|source| ConfigError::InvalidUrl {
            url: trimmed.to_string(),
            source,
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(url.scheme().to_string()));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self {
            base_url: url,
            admin_id: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Set the admin login id. Blank values unset it.
    pub fn with_admin_id(mut self, admin_id: Option<String>) -> Self {
        self.admin_id = admin_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Result<Self, ConfigError> {
        if secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        self.timeout_secs = secs;
        Ok(self)
    }

    /// Whether `id` logs in through the admin endpoint.
    pub fn is_admin_id(&self, id: &str) -> bool {
        self.admin_id.as_deref() == Some(id)
    }
}
