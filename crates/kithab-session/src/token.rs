//! # Token Decoding
//!
//! Reads the claims of a JWT bearer token without verifying its signature.
//! The backend is the only party that trusts the token; the client needs the
//! `exp` claim solely to schedule the local expiry timer.
//!
//! `exp` is seconds since the Unix epoch. Fractional values are accepted and
//! kept to millisecond precision.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use thiserror::Error;

use kithab_core::AuthToken;

/// Why a token could not be decoded.
#[derive(Error, Debug)]
pub enum TokenError {
    /// Not three dot-separated segments.
    #[error("token is not a JWT: expected 3 segments, found {segments}")]
    Malformed {
        /// Number of segments found.
        segments: usize,
    },

    /// The payload segment is not base64url.
    #[error("token payload is not base64url: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// The payload is not a JSON object.
    #[error("token payload is not JSON: {0}")]
    Payload(#[from] serde_json::Error),

    /// No numeric `exp` claim.
    #[error("token has no numeric exp claim")]
    MissingExpiry,

    /// `exp` does not fit a timestamp.
    #[error("token exp claim {0} is out of range")]
    ExpiryOutOfRange(f64),
}

/// The claims the client cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenClaims {
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
    /// `sub` or `id`, when present.
    pub subject: Option<String>,
    /// `role`, when present.
    pub role: Option<String>,
}

impl TokenClaims {
    /// Whether the token has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Decode the payload of `token`.
pub fn decode(token: &AuthToken) -> Result<TokenClaims, TokenError> {
    let segments: Vec<&str> = token.expose().split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::Malformed {
            segments: segments.len(),
        });
    }
    let bytes = URL_SAFE_NO_PAD.decode(segments[1].trim_end_matches('='))?;
    let payload: serde_json::Value = serde_json::from_slice(&bytes)?;

    let exp = payload
        .get("exp")
        .and_then(serde_json::Value::as_f64)
        .ok_or(TokenError::MissingExpiry)?;
    let millis = (exp * 1000.0).round();
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return Err(TokenError::ExpiryOutOfRange(exp));
    }
    let expires_at =
        DateTime::from_timestamp_millis(millis as i64).ok_or(TokenError::ExpiryOutOfRange(exp))?;

    let text = |key: &str| {
        payload.get(key).and_then(|v| match v {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    };
    Ok(TokenClaims {
        expires_at,
        subject: text("sub").or_else(|| text("id")),
        role: text("role"),
    })
}

/// Build an unsigned token carrying `claims`.
///
/// The signature segment is a fixed placeholder. Useful for fixtures and for
/// exercising the expiry timer without a backend.
pub fn unsigned(claims: &serde_json::Value) -> AuthToken {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    AuthToken::new(format!("{header}.{payload}.unsigned"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_integer_exp() {
        let token = unsigned(&json!({"exp": 1_700_000_000, "id": "f1", "role": "faculty"}));
        let claims = decode(&token).unwrap();
        assert_eq!(claims.expires_at.timestamp(), 1_700_000_000);
        assert_eq!(claims.subject.as_deref(), Some("f1"));
        assert_eq!(claims.role.as_deref(), Some("faculty"));
    }

    #[test]
    fn test_decode_fractional_exp_keeps_millis() {
        let token = unsigned(&json!({"exp": 1_700_000_000.125}));
        let claims = decode(&token).unwrap();
        assert_eq!(claims.expires_at.timestamp_millis(), 1_700_000_000_125);
    }

    #[test]
    fn test_padded_payload_accepted() {
        let payload = base64::engine::general_purpose::URL_SAFE.encode(br#"{"exp":12}"#);
        let token = AuthToken::new(format!("h.{payload}.s"));
        assert!(decode(&token).is_ok());
    }

    #[test]
    fn test_rejections() {
        assert!(matches!(
            decode(&AuthToken::new("not-a-jwt")),
            Err(TokenError::Malformed { segments: 1 })
        ));
        assert!(matches!(
            decode(&AuthToken::new("a.!!!.c")),
            Err(TokenError::Encoding(_))
        ));
        let no_json = URL_SAFE_NO_PAD.encode(b"plain");
        assert!(matches!(
            decode(&AuthToken::new(format!("a.{no_json}.c"))),
            Err(TokenError::Payload(_))
        ));
        assert!(matches!(
            decode(&unsigned(&json!({"exp": "soon"}))),
            Err(TokenError::MissingExpiry)
        ));
        assert!(matches!(
            decode(&unsigned(&json!({"exp": 1e300}))),
            Err(TokenError::ExpiryOutOfRange(_))
        ));
    }

    #[test]
    fn test_is_expired_at() {
        let claims = decode(&unsigned(&json!({"exp": 100}))).unwrap();
        let at = |s: i64| DateTime::from_timestamp(s, 0).unwrap();
        assert!(!claims.is_expired_at(at(99)));
        assert!(claims.is_expired_at(at(100)));
    }
}
