//! Authentication endpoints.
//!
//! The login id decides the route: the configured admin id goes to
//! `/auth/admin/login` and the user comes back under `admin`; every other id
//! is an employee id, sent to `/auth/faculty/login`, with the user under
//! `faculty`.

use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use kithab_core::{Account, AuthToken, Credentials, LoginGrant, Role};
use kithab_session::Authenticator;

use crate::client::KithabClient;
use crate::error::ApiError;

/// Message shown when the reset form is incomplete.
pub const FORGOT_PASSWORD_INCOMPLETE: &str = "Please select role and enter ID";

/// `/auth/*` endpoints.
#[derive(Debug)]
pub struct AuthClient<'a> {
    client: &'a KithabClient,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(flatten)]
    rest: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: Option<String>,
}

impl<'a> AuthClient<'a> {
    pub(crate) fn new(client: &'a KithabClient) -> Self {
        Self { client }
    }

    /// Log in and return the token and user.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginGrant, ApiError> {
        let id = credentials.id();
        let (path, body, user_key, role) = if self.client.config().is_admin_id(id) {
            (
                "auth/admin/login",
                json!({ "adminId": id, "password": credentials.password() }),
                "admin",
                Role::Admin,
            )
        } else {
            (
                "auth/faculty/login",
                json!({ "employeeId": id, "password": credentials.password() }),
                "faculty",
                Role::Faculty,
            )
        };

        let request = self.client.request(Method::POST, path)?.json(&body);
        let mut resp: LoginResponse = self.client.send_json(request, path).await?;

        let token = resp
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::MissingField {
                endpoint: path.to_string(),
                field: "token",
            })?;
        let account = resp
            .rest
            .remove(user_key)
            .and_then(|user| Account::from_value(user, role))
            .ok_or_else(|| ApiError::MissingField {
                endpoint: path.to_string(),
                field: user_key,
            })?;

        tracing::info!(route = user_key, "login accepted");
        Ok(LoginGrant {
            token: AuthToken::new(token),
            account,
        })
    }

    /// Request a password reset and return the server's message.
    ///
    /// # Errors
    ///
    /// A blank id is rejected locally with [`FORGOT_PASSWORD_INCOMPLETE`].
    pub async fn forgot_password(&self, role: Role, id: &str) -> Result<String, ApiError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ApiError::Rejected(FORGOT_PASSWORD_INCOMPLETE.into()));
        }
        let path = "auth/forgot-password";
        let request = self
            .client
            .request(Method::POST, path)?
            .json(&json!({ "role": role.as_str(), "id": id }));
        let resp: Option<MessageResponse> = self.client.send_json(request, path).await?;
        Ok(resp
            .and_then(|r| r.message)
            .unwrap_or_else(|| "Password reset requested".to_string()))
    }
}

impl Authenticator for KithabClient {
    type Error = ApiError;

    async fn authenticate(&self, credentials: &Credentials) -> Result<LoginGrant, Self::Error> {
        self.auth().login(credentials).await
    }
}
