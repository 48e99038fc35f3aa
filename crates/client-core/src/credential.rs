//! Access token credential
//!
//! Tokens are compact JWTs issued by the external identity service. The
//! panel never verifies signatures (that is the SDK's and the service's
//! job); it only checks that the token is well formed and not already
//! expired, and pulls out the user id for display and logging.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::error::{AuthError, ClientResult};

#[derive(Debug, Deserialize)]
struct Claims {
    exp: Option<i64>,
    skypeid: Option<String>,
    sub: Option<String>,
}

/// A parsed bearer token handed to the calling SDK
#[derive(Clone)]
pub struct TokenCredential {
    token: String,
    user_id: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl TokenCredential {
    /// Parse and sanity-check a token, rejecting it if it expired before now.
    pub fn parse(token: &str) -> ClientResult<Self> {
        Self::parse_at(token, Utc::now())
    }

    /// Parse a token, judging expiry against `now`.
    pub fn parse_at(token: &str, now: DateTime<Utc>) -> ClientResult<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken.into());
        }

        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 || segments[0].is_empty() || segments[1].is_empty() {
            return Err(AuthError::MalformedToken("expected three dot-separated segments".into()).into());
        }

        let payload = URL_SAFE_NO_PAD
            .decode(segments[1].trim_end_matches('='))
            .map_err(|e| AuthError::MalformedToken(format!("payload is not base64url: {}", e)))?;
        let claims: Claims = serde_json::from_slice(&payload)
            .map_err(|e| AuthError::MalformedToken(format!("payload is not a claims object: {}", e)))?;

        let expires_at = match claims.exp {
            Some(exp) => Some(
                Utc.timestamp_opt(exp, 0)
                    .single()
                    .ok_or_else(|| AuthError::MalformedToken(format!("exp claim out of range: {}", exp)))?,
            ),
            None => None,
        };
        if let Some(at) = expires_at {
            if at <= now {
                return Err(AuthError::Expired(at).into());
            }
        }

        Ok(Self {
            token: token.to_string(),
            user_id: claims.skypeid.or(claims.sub),
            expires_at,
        })
    }

    /// The raw token, as passed to the SDK
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Communication user id carried by the token, if any
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Expiry carried by the token, if any
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

impl std::fmt::Debug for TokenCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCredential")
            .field("token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
