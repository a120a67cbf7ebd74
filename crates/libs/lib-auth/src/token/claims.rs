//! # Token Types
//!
//! Claim sets carried by access and refresh tokens, the identity used to
//! mint them, and the token pair handed back to clients.

use chrono::{DateTime, Duration, Utc};
use lib_utils::{now_utc, unix_to_utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::TokenError;

/// Identity-enrichment data embedded in an access token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
    pub metadata: Map<String, Value>,
}

impl Identity {
    /// Identity carrying only a user id.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Access token claims: identity fields plus registered claims.
///
/// Empty identity fields are left out of the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    /// Issuer
    pub iss: String,
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration (unix seconds)
    pub exp: i64,
}

impl Claims {
    pub(crate) fn new(
        identity: &Identity,
        issuer: &str,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, TokenError> {
        Ok(Self {
            user_id: identity.user_id.clone(),
            username: identity.username.clone(),
            email: identity.email.clone(),
            roles: identity.roles.clone(),
            metadata: identity.metadata.clone(),
            iss: issuer.to_string(),
            sub: identity.user_id.clone(),
            iat: issued_at.timestamp(),
            exp: expiry(issued_at, ttl)?,
        })
    }

    /// Expiry as a timestamp.
    pub fn expires_at(&self) -> Result<DateTime<Utc>, TokenError> {
        unix_to_utc(self.exp).map_err(|e| TokenError::MalformedClaims(e.to_string()))
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// True when at least one of `required` is among the token's roles.
    ///
    /// An empty `required` set never matches.
    pub fn has_any_role<S: AsRef<str>>(&self, required: &[S]) -> bool {
        required.iter().any(|role| self.has_role(role.as_ref()))
    }

    /// Identity fields embedded in the token.
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            roles: self.roles.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

/// Refresh token claims: registered claims only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl RefreshClaims {
    pub(crate) fn new(
        user_id: &str,
        issuer: &str,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, TokenError> {
        Ok(Self {
            iss: issuer.to_string(),
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expiry(issued_at, ttl)?,
        })
    }
}

fn expiry(issued_at: DateTime<Utc>, ttl: Duration) -> Result<i64, TokenError> {
    issued_at
        .checked_add_signed(ttl)
        .map(|exp| exp.timestamp())
        .ok_or_else(|| TokenError::Signing(format!("expiry out of range for ttl {}", ttl)))
}

/// Access/refresh token pair returned at login and refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry of the access token.
    pub expires_at: DateTime<Utc>,
    pub token_type: String,
}

impl TokenPair {
    pub const BEARER: &'static str = "Bearer";

    pub fn is_expired(&self) -> bool {
        now_utc() > self.expires_at
    }

    /// Time left before the access token expires; zero once expired.
    pub fn remaining(&self) -> Duration {
        let left = self.expires_at - now_utc();
        if left < Duration::zero() {
            Duration::zero()
        } else {
            left
        }
    }
}
