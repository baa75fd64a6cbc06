//! # Portal Client
//!
//! [`KithabClient`] wraps one `reqwest::Client` and the backend base URL.
//! Endpoint groups are reached through borrowed sub-clients:
//!
//! | Accessor  | Endpoints                                               |
//! |-----------|---------------------------------------------------------|
//! | `auth()`  | `/auth/*` login and password reset                      |
//! | `meta()`  | `/meta/*` reads and `/admin/{regulations,branches,subjects}` |
//! | `notes()` | `/notes/*` browse, upload, own uploads                  |
//! | `admin()` | `/admin/notes*`, `/admin/faculty*`                      |
//!
//! A client carries at most one bearer token. [`KithabClient::authorized`]
//! returns a copy bound to a token; calls that need one fail with
//! [`ApiError::NotAuthenticated`] otherwise.
//!
//! No call is retried.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use kithab_core::AuthToken;

use crate::admin::AdminClient;
use crate::auth::AuthClient;
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::meta::MetaClient;
use crate::notes::NotesClient;

/// Typed client for the portal backend.
#[derive(Debug, Clone)]
pub struct KithabClient {
    http: reqwest::Client,
    config: Arc<ApiConfig>,
    token: Option<AuthToken>,
}

impl KithabClient {
    /// Build a client from validated configuration.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|source| ApiError::Http {
                endpoint: "client builder".into(),
                source,
            })?;
        Ok(Self {
            http,
            config: Arc::new(config),
            token: None,
        })
    }

    /// A copy of this client that sends `token` as the bearer.
    pub fn authorized(&self, token: AuthToken) -> Self {
        Self {
            http: self.http.clone(),
            config: Arc::clone(&self.config),
            token: Some(token),
        }
    }

    /// The configuration in use.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Whether a bearer token is attached.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Authentication endpoints.
    pub fn auth(&self) -> AuthClient<'_> {
        AuthClient::new(self)
    }

    /// Academic metadata endpoints.
    pub fn meta(&self) -> MetaClient<'_> {
        MetaClient::new(self)
    }

    /// Note endpoints.
    pub fn notes(&self) -> NotesClient<'_> {
        NotesClient::new(self)
    }

    /// Admin management endpoints.
    pub fn admin(&self) -> AdminClient<'_> {
        AdminClient::new(self)
    }

    // ─── Request plumbing ────────────────────────────────────────────

    pub(crate) fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.config
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|source| {
                ApiError::Config(crate::config::ConfigError::InvalidUrl {
                    url: path.to_string(),
                    source,
                })
            })
    }

    /// A request with the bearer attached when one is held.
    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let builder = self.http.request(method, self.url(path)?);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        })
    }

    /// A request that must carry the bearer.
    pub(crate) fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        if self.token.is_none() {
            return Err(ApiError::NotAuthenticated);
        }
        self.request(method, path)
    }

    /// A request to an absolute URL with no bearer (presigned storage URLs).
    pub(crate) fn external(&self, method: Method, url: &str) -> Result<RequestBuilder, ApiError> {
        let url = Url::parse(url).map_err(|source| {
            ApiError::Config(crate::config::ConfigError::InvalidUrl {
                url: url.to_string(),
                source,
            })
        })?;
        Ok(self.http.request(method, url))
    }

    /// Send a request and map transport and status failures.
    pub(crate) async fn send(&self, request: RequestBuilder, endpoint: &str) -> Result<Response, ApiError> {
        let resp = request.send().await.map_err(|source| {
            tracing::warn!(endpoint, "request failed: {source}");
            ApiError::Http {
                endpoint: endpoint.to_string(),
                source,
            }
        })?;

        let status = resp.status();
        if status.is_success() {
            tracing::debug!(endpoint, status = status.as_u16(), "request succeeded");
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = server_message(&body).unwrap_or_else(|| fallback_message(status));
        tracing::warn!(endpoint, status = status.as_u16(), "backend returned {status}: {message}");
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized {
                endpoint: endpoint.to_string(),
                message,
            });
        }
        Err(ApiError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            message,
        })
    }

    /// Send and decode a JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        endpoint: &str,
    ) -> Result<T, ApiError> {
        let resp = self.send(request, endpoint).await?;
        let bytes = resp.bytes().await.map_err(|source| ApiError::Http {
            endpoint: endpoint.to_string(),
            source,
        })?;
        // Some endpoints answer 200 with an empty body.
        let bytes: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes
        };
        serde_json::from_slice(bytes).map_err(|source| ApiError::Deserialization {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

/// The `message` field of an error body.
fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

fn fallback_message(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("request failed: {} {reason}", status.as_u16()),
        None => format!("request failed: {}", status.as_u16()),
    }
}
