//! # Session State Machine
//!
//! ```text
//!              login / establish / restore (valid token)
//! Anonymous ─────────────────────────────────────────────▶ Authenticated
//!     ▲                                                        │
//!     └──── logout │ timer fires │ 401 │ undecodable token ────┘
//! ```
//!
//! A [`Session`] is an explicit context object: cheap to clone, shared by
//! everything that needs the token. It owns the only expiry timer. Each
//! token change aborts the previous timer and bumps a generation counter, so
//! a timer that already woke up for an older token does nothing.
//!
//! ## Runtime
//!
//! The timer is a tokio task. Operations that may schedule one (`restore`,
//! `establish`, `login`) require a tokio runtime and fail with
//! [`SessionError::NoRuntime`] outside of one.

use std::future::Future;
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use kithab_core::{Account, AuthToken, Credentials, KithabError, LoginGrant};

use crate::store::{SessionStore, StoreError, StoredSession};
use crate::token::{self, TokenError};

// ─── State ───────────────────────────────────────────────────────────

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogoutReason {
    /// The user logged out.
    Manual,
    /// The token's `exp` passed.
    Expired,
    /// The token could not be decoded.
    InvalidToken,
    /// The backend rejected the token.
    Unauthorized,
}

impl std::fmt::Display for LogoutReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Manual => "MANUAL",
            Self::Expired => "EXPIRED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::Unauthorized => "UNAUTHORIZED",
        };
        f.write_str(s)
    }
}

/// A held token and the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    /// Bearer token.
    pub token: AuthToken,
    /// The logged-in user.
    pub account: Account,
    /// Decoded `exp`.
    pub expires_at: DateTime<Utc>,
}

/// Session lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No token held.
    #[default]
    Anonymous,
    /// A token is held and its expiry is scheduled.
    Authenticated(ActiveSession),
}

impl SessionState {
    /// Whether a token is held.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => f.write_str("ANONYMOUS"),
            Self::Authenticated(_) => f.write_str("AUTHENTICATED"),
        }
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Session operation failures.
#[derive(Error, Debug)]
pub enum SessionError {
    /// `login` was called while a session is active.
    #[error("already logged in; log out first")]
    AlreadyAuthenticated,

    /// Missing id or password.
    #[error(transparent)]
    Credentials(#[from] KithabError),

    /// The backend refused the login. The message is surfaced verbatim.
    #[error("{0}")]
    Login(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The issued token could not be decoded.
    #[error("invalid session token: {0}")]
    Token(#[from] TokenError),

    /// The issued token is already past its expiry.
    #[error("session token expired at {0}")]
    Expired(DateTime<Utc>),

    /// Persisting the session failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// No tokio runtime to run the expiry timer on.
    #[error("no async runtime available for the session expiry timer")]
    NoRuntime,
}

// ─── Authenticator ───────────────────────────────────────────────────

/// Exchanges credentials for a [`LoginGrant`].
pub trait Authenticator: Send + Sync {
    /// Failure type; its `Display` is shown to the user.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Perform the login call.
    fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<LoginGrant, Self::Error>> + Send;
}

// ─── Session ─────────────────────────────────────────────────────────

type LogoutHook = Arc<dyn Fn(LogoutReason) + Send + Sync>;

struct Inner {
    state: SessionState,
    timer: Option<JoinHandle<()>>,
    generation: u64,
    on_logout: Option<LogoutHook>,
}

struct Shared<S> {
    store: S,
    inner: Mutex<Inner>,
}

/// The session context.
pub struct Session<S: SessionStore> {
    shared: Arc<Shared<S>>,
}

impl<S: SessionStore> Clone for Session<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: SessionStore> std::fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.shared.inner.lock().state.to_string())
            .finish()
    }
}

impl<S: SessionStore> Session<S> {
    /// An anonymous session backed by `store`. Call [`Self::restore`] to pick
    /// up a previously stored login.
    pub fn new(store: S) -> Self {
        Self {
            shared: Arc::new(Shared {
                store,
                inner: Mutex::new(Inner {
                    state: SessionState::Anonymous,
                    timer: None,
                    generation: 0,
                    on_logout: None,
                }),
            }),
        }
    }

    /// Register a callback invoked after every logout, with its reason.
    pub fn on_logout(&self, hook: impl Fn(LogoutReason) + Send + Sync + 'static) {
        self.shared.inner.lock().on_logout = Some(Arc::new(hook));
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.shared.store
    }

    /// A copy of the current state.
    pub fn state(&self) -> SessionState {
        self.shared.inner.lock().state.clone()
    }

    /// Whether a token is held.
    pub fn is_authenticated(&self) -> bool {
        self.shared.inner.lock().state.is_authenticated()
    }

    /// The held token.
    pub fn token(&self) -> Option<AuthToken> {
        match &self.shared.inner.lock().state {
            SessionState::Authenticated(active) => Some(active.token.clone()),
            SessionState::Anonymous => None,
        }
    }

    /// The logged-in user.
    pub fn account(&self) -> Option<Account> {
        match &self.shared.inner.lock().state {
            SessionState::Authenticated(active) => Some(active.account.clone()),
            SessionState::Anonymous => None,
        }
    }

    // ─── Transitions ─────────────────────────────────────────────────

    /// Resume the stored session.
    ///
    /// An undecodable or expired stored token is cleared immediately, with
    /// the matching [`LogoutReason`]. A corrupt store is cleared as an
    /// invalid token. Returns the resumed user.
    pub fn restore(&self) -> Result<Option<Account>, SessionError> {
        let handle = Handle::try_current().map_err(|_| SessionError::NoRuntime)?;
        let stored = match self.shared.store.load() {
            Ok(Some(stored)) => stored,
            Ok(None) => return Ok(None),
            Err(StoreError::Corrupt { path, source }) => {
                tracing::warn!(path = %path.display(), "discarding corrupt session file: {source}");
                self.logout_with(LogoutReason::InvalidToken);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let claims = match token::decode(&stored.token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!("stored token is invalid: {e}");
                self.logout_with(LogoutReason::InvalidToken);
                return Ok(None);
            }
        };
        if claims.is_expired_at(Utc::now()) {
            tracing::info!(expired_at = %claims.expires_at, "stored session has expired");
            self.logout_with(LogoutReason::Expired);
            return Ok(None);
        }

        let account = stored.user.clone();
        let mut inner = self.shared.inner.lock();
        self.activate_locked(&mut inner, &handle, stored, claims.expires_at);
        Ok(Some(account))
    }

    /// Log in through `authenticator`. Only valid while anonymous.
    ///
    /// Credentials are trimmed and checked before any call is made. On
    /// failure the session stays anonymous.
    pub async fn login<A: Authenticator>(
        &self,
        authenticator: &A,
        id: &str,
        password: &str,
    ) -> Result<Account, SessionError> {
        if self.is_authenticated() {
            return Err(SessionError::AlreadyAuthenticated);
        }
        Handle::try_current().map_err(|_| SessionError::NoRuntime)?;
        let credentials = Credentials::new(id, password)?;
        let grant = authenticator.authenticate(&credentials).await.map_err(|e| {
            tracing::warn!(id = credentials.id(), "login failed: {e}");
            SessionError::Login(Box::new(e))
        })?;
        let account = grant.account.clone();
        self.establish(grant)?;
        tracing::info!(id = credentials.id(), role = %account.role, "logged in");
        Ok(account)
    }

    /// Adopt an issued token: persist it, enter `Authenticated` and schedule
    /// the expiry timer, replacing any previous session.
    ///
    /// # Errors
    ///
    /// The token is rejected, and nothing is stored, when it cannot be
    /// decoded or has already expired.
    pub fn establish(&self, grant: LoginGrant) -> Result<(), SessionError> {
        let handle = Handle::try_current().map_err(|_| SessionError::NoRuntime)?;
        let claims = token::decode(&grant.token)?;
        if claims.is_expired_at(Utc::now()) {
            return Err(SessionError::Expired(claims.expires_at));
        }
        let stored = StoredSession {
            token: grant.token,
            user: grant.account,
        };
        // Saved under the lock so a pending expiry of the previous token
        // cannot clear the store between the save and the state change.
        let mut inner = self.shared.inner.lock();
        self.shared.store.save(&stored)?;
        self.activate_locked(&mut inner, &handle, stored, claims.expires_at);
        Ok(())
    }

    /// Manual logout.
    pub fn logout(&self) {
        self.logout_with(LogoutReason::Manual);
    }

    /// Clear the token and user from memory and storage, cancel the timer
    /// and notify the logout callback. Valid from any state.
    pub fn logout_with(&self, reason: LogoutReason) {
        let hook = {
            let mut inner = self.shared.inner.lock();
            if let Some(timer) = inner.timer.take() {
                timer.abort();
            }
            self.clear_locked(&mut inner, reason)
        };
        if let Some(hook) = hook {
            hook(reason);
        }
    }

    fn activate_locked(
        &self,
        inner: &mut Inner,
        handle: &Handle,
        stored: StoredSession,
        expires_at: DateTime<Utc>,
    ) {
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }
        inner.generation += 1;
        let generation = inner.generation;
        let delay = (expires_at - Utc::now()).to_std().unwrap_or_default();
        let weak = Arc::downgrade(&self.shared);
        inner.timer = Some(handle.spawn(async move {
            tokio::time::sleep(delay).await;
            Self::expire(weak, generation);
        }));
        inner.state = SessionState::Authenticated(ActiveSession {
            token: stored.token,
            account: stored.user,
            expires_at,
        });
        tracing::debug!(%expires_at, generation, "session expiry scheduled");
    }

    fn expire(weak: Weak<Shared<S>>, generation: u64) {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let session = Self { shared };
        let hook = {
            let mut inner = session.shared.inner.lock();
            if inner.generation != generation {
                return;
            }
            // Running inside the timer task; dropping the handle detaches it.
            inner.timer = None;
            session.clear_locked(&mut inner, LogoutReason::Expired)
        };
        if let Some(hook) = hook {
            hook(LogoutReason::Expired);
        }
    }

    fn clear_locked(&self, inner: &mut Inner, reason: LogoutReason) -> Option<LogoutHook> {
        inner.generation += 1;
        let was = std::mem::take(&mut inner.state);
        if let Err(e) = self.shared.store.clear() {
            tracing::warn!("failed to clear stored session: {e}");
        }
        match (was.is_authenticated(), reason) {
            (true, LogoutReason::Manual) => tracing::info!("logged out"),
            (_, LogoutReason::Manual) => {}
            _ => tracing::warn!(%reason, "session ended"),
        }
        inner.on_logout.clone()
    }
}
