//! # Accounts and Credentials
//!
//! The logged-in user, the credentials used to obtain a session, and the
//! bearer token the backend issues. Secret material is held in
//! [`zeroize::Zeroizing`] buffers and redacted from `Debug` output.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroizing;

use crate::error::KithabError;
use crate::wire::{lenient, RefShape};

/// Portal role. Decides which screens a user may reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Manages metadata, faculty and all notes.
    Admin,
    /// Uploads and manages own notes.
    Faculty,
    /// Browses and downloads notes.
    Student,
}

impl Role {
    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Faculty => "faculty",
            Self::Student => "student",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "faculty" => Ok(Self::Faculty),
            "student" => Ok(Self::Student),
            other => Err(format!("unknown role: {other:?}")),
        }
    }
}

// ─── Account ─────────────────────────────────────────────────────────

/// The authenticated user as returned by a login call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Backend document id, when the payload carried one.
    pub id: Option<String>,
    /// Display name.
    pub name: String,
    /// Role.
    pub role: Role,
    /// Email address.
    pub email: Option<String>,
    /// Employee id (faculty only).
    pub employee_id: Option<String>,
    /// Job title (faculty only).
    pub designation: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAccount {
    #[serde(rename = "_id", alias = "id", default, deserialize_with = "lenient")]
    id: Option<RefShape>,
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    role: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    email: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    employee_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    designation: Option<String>,
}

impl Account {
    /// Normalize the user object of a login response.
    ///
    /// `fallback_role` applies when the payload carries no recognizable
    /// `role`; it is the role implied by the login endpoint used.
    pub fn from_value(value: serde_json::Value, fallback_role: Role) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        let raw: RawAccount = serde_json::from_value(value).ok()?;
        let role = raw
            .role
            .and_then(|r| r.parse().ok())
            .unwrap_or(fallback_role);
        Some(Self {
            id: raw.id.and_then(|r| r.id()),
            name: raw.name.unwrap_or_default(),
            role,
            email: raw.email,
            employee_id: raw.employee_id,
            designation: raw.designation,
        })
    }
}

// ─── Credentials ─────────────────────────────────────────────────────

/// A login id and password, trimmed and checked for presence.
#[derive(Clone)]
pub struct Credentials {
    id: String,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Trim both values.
    ///
    /// # Errors
    ///
    /// Returns [`KithabError::MissingCredentials`] when either is empty after
    /// trimming.
    pub fn new(id: &str, password: &str) -> Result<Self, KithabError> {
        let id = id.trim();
        let password = password.trim();
        if id.is_empty() || password.is_empty() {
            return Err(KithabError::MissingCredentials);
        }
        Ok(Self {
            id: id.to_string(),
            password: Zeroizing::new(password.to_string()),
        })
    }

    /// The login id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The password.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

// ─── Token ───────────────────────────────────────────────────────────

/// An opaque bearer token (a JWT in practice).
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(Zeroizing<String>);

impl AuthToken {
    /// Wrap a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    /// The raw token.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Value for an `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.expose())
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

impl Serialize for AuthToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl<'de> Deserialize<'de> for AuthToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// What a successful login yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGrant {
    /// Bearer token.
    pub token: AuthToken,
    /// The authenticated user.
    pub account: Account,
}
