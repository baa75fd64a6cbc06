//! Per-invocation state shared by every subcommand: the resolved
//! configuration, an anonymous client and the persisted session.

use anyhow::{bail, Result};

use kithab_client::{ApiError, KithabClient};
use kithab_core::{Account, Role};
use kithab_session::{FileStore, LogoutReason, Session};

use crate::config::CliConfig;

/// Shared command context.
pub struct AppContext {
    config: CliConfig,
    client: KithabClient,
    session: Session<FileStore>,
    json: bool,
}

impl AppContext {
    /// Build the client and resume any stored session. Must run inside a
    /// tokio runtime.
    pub fn open(config: CliConfig, json: bool) -> Result<Self> {
        let client = KithabClient::new(config.api_config()?)?;
        let session = Session::new(FileStore::new(config.session_path()?));
        session.on_logout(|reason| match reason {
            LogoutReason::Manual => tracing::info!("logged out"),
            other => tracing::warn!(reason = %other, "session ended"),
        });
        if let Some(account) = session.restore()? {
            tracing::debug!(role = %account.role, "resumed stored session");
        }
        Ok(Self {
            config,
            client,
            session,
            json,
        })
    }

    /// The resolved configuration.
    pub fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Client without a bearer, for public endpoints.
    pub fn client(&self) -> &KithabClient {
        &self.client
    }

    /// The session.
    pub fn session(&self) -> &Session<FileStore> {
        &self.session
    }

    /// Whether output should be JSON.
    pub fn json(&self) -> bool {
        self.json
    }

    /// A client bound to the session token, provided the logged-in user has
    /// `role`.
    pub fn require(&self, role: Role) -> Result<(KithabClient, Account)> {
        let (Some(token), Some(account)) = (self.session.token(), self.session.account()) else {
            bail!("not logged in; run `kithab login` first");
        };
        if account.role != role {
            bail!("this command requires the {role} role (logged in as {})", account.role);
        }
        Ok((self.client.authorized(token), account))
    }

    /// Pass a client result through, ending the session on a 401.
    pub fn check<T>(&self, result: Result<T, ApiError>) -> Result<T> {
        match result {
            Err(e) if e.is_unauthorized() => {
                self.session.logout_with(LogoutReason::Unauthorized);
                bail!("{e}; you have been logged out")
            }
            other => Ok(other?),
        }
    }

    /// Print `value` as pretty JSON.
    pub fn print_json<T: serde::Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}
