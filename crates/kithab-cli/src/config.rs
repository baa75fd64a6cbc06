//! # CLI Configuration
//!
//! Layered in order, later layers winning:
//!
//! 1. Built-in defaults.
//! 2. A YAML file given with `--config`.
//! 3. Environment: `KITHAB_BACKEND_URL`, `KITHAB_ADMIN_ID`,
//!    `KITHAB_TIMEOUT_SECS`, `KITHAB_SESSION_FILE`.
//!
//! ```yaml
//! backend_url: https://notes.example.edu/api
//! admin_id: ADMIN01
//! timeout_secs: 20
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;

use kithab_client::{ApiConfig, DEFAULT_TIMEOUT_SECS};

/// Backend used when nothing else is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000/api";

/// Name of the session file inside the data directory.
pub const SESSION_FILE_NAME: &str = "session.json";

/// Resolved CLI settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Backend root URL.
    pub backend_url: String,
    /// Login id routed to the admin endpoint.
    pub admin_id: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Where the session is persisted. Defaults to the platform data dir.
    pub session_file: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            admin_id: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            session_file: None,
        }
    }
}

impl CliConfig {
    /// Defaults, then `path` when given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a YAML config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Overlay environment variables looked up through `var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = var("KITHAB_BACKEND_URL") {
            self.backend_url = url;
        }
        if let Some(id) = var("KITHAB_ADMIN_ID") {
            self.admin_id = Some(id);
        }
        if let Some(secs) = var("KITHAB_TIMEOUT_SECS") {
            self.timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("KITHAB_TIMEOUT_SECS is not a number: {secs:?}"))?;
        }
        if let Some(file) = var("KITHAB_SESSION_FILE") {
            self.session_file = Some(PathBuf::from(file));
        }
        Ok(())
    }

    /// Validated client configuration.
    pub fn api_config(&self) -> Result<ApiConfig> {
        let config = ApiConfig::new(&self.backend_url)?
            .with_admin_id(self.admin_id.clone())
            .with_timeout_secs(self.timeout_secs)?;
        Ok(config)
    }

    /// The session file: configured, or `session.json` in the platform data
    /// directory.
    pub fn session_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.session_file {
            return Ok(path.clone());
        }
        let dirs = ProjectDirs::from("edu", "Kithab", "kithab")
            .context("could not determine a home directory for the session file")?;
        Ok(dirs.data_dir().join(SESSION_FILE_NAME))
    }
}
