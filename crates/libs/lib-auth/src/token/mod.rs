//! # JWT Token Management
//!
//! Issuance, validation and refresh of HMAC-signed access/refresh tokens.
//!
//! Tokens are self-contained: nothing is persisted server side, so a token
//! stays valid until its `exp` passes. There is no revocation.
//!
//! ```rust,no_run
//! use chrono::Duration;
//! use lib_auth::{Identity, JwtConfig, JwtService};
//!
//! let service = JwtService::new(JwtConfig {
//!     secret: "a-secret-of-at-least-thirty-two-bytes!".to_string(),
//!     access_ttl: Duration::minutes(15),
//!     ..JwtConfig::default()
//! });
//!
//! let pair = service
//!     .issue_token_pair(&Identity::new("u1").with_roles(["admin"]))
//!     .unwrap();
//! let claims = service.validate_token(&pair.access_token).unwrap();
//! assert!(claims.has_role("admin"));
//! ```

mod claims;

pub use claims::{Claims, Identity, RefreshClaims, TokenPair};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use lib_utils::now_utc;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Minimum secret length accepted by [`JwtConfig::validate`].
pub const MIN_SECRET_LEN: usize = 32;

/// Longest token lifetime accepted by [`JwtConfig::validate`], in days.
pub const MAX_TTL_DAYS: i64 = 3650;

/// Token failures. Validation distinguishes expiry from every other defect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("unexpected signing method")]
    WrongSigningMethod,

    #[error("malformed claims: {0}")]
    MalformedClaims(String),

    #[error("failed to sign token: {0}")]
    Signing(String),

    #[error("invalid JWT configuration: {0}")]
    Config(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidAlgorithm => TokenError::WrongSigningMethod,
            ErrorKind::MissingRequiredClaim(claim) => {
                TokenError::MalformedClaims(format!("missing required claim `{}`", claim))
            }
            _ => TokenError::Invalid(err.to_string()),
        }
    }
}

/// Signing configuration, fixed for the lifetime of a [`JwtService`].
#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC secret
    pub secret: String,
    /// Access token lifetime
    pub access_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_ttl: Duration,
    /// Value of the `iss` claim, also required on validation
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
            issuer: "commons-toolkit".to_string(),
        }
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"***REDACTED***")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl JwtConfig {
    pub fn validate(&self) -> Result<(), TokenError> {
        if self.secret.len() < MIN_SECRET_LEN {
            return Err(TokenError::Config(format!(
                "secret must be at least {} characters long",
                MIN_SECRET_LEN
            )));
        }
        if self.access_ttl <= Duration::zero() || self.refresh_ttl <= Duration::zero() {
            return Err(TokenError::Config("token lifetimes must be positive".to_string()));
        }
        let max_ttl = Duration::days(MAX_TTL_DAYS);
        if self.access_ttl > max_ttl || self.refresh_ttl > max_ttl {
            return Err(TokenError::Config(format!(
                "token lifetimes cannot exceed {} days",
                MAX_TTL_DAYS
            )));
        }
        if self.issuer.trim().is_empty() {
            return Err(TokenError::Config("issuer cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Stateless JWT service. Safe to share across threads.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for JwtService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtService").field("config", &self.config).finish()
    }
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Any HMAC variant is accepted; other families fail with InvalidAlgorithm.
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = 0;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            config,
        }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Sign an access token carrying `identity`, expiring after the access TTL.
    pub fn issue_access_token(&self, identity: &Identity) -> Result<String, TokenError> {
        self.sign_access_token(identity, now_utc())
    }

    /// Sign a refresh token for `user_id`, expiring after the refresh TTL.
    pub fn issue_refresh_token(&self, user_id: &str) -> Result<String, TokenError> {
        self.sign_refresh_token(user_id, now_utc())
    }

    /// Sign both tokens with a shared issue time.
    pub fn issue_token_pair(&self, identity: &Identity) -> Result<TokenPair, TokenError> {
        self.sign_token_pair(identity, now_utc())
    }

    /// Verify signature, algorithm family, issuer and expiry, then return the claims.
    ///
    /// A token without a `user_id` claim, such as a refresh token, reports
    /// its subject as the user id.
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        let mut claims: Claims = self.decode_checked(token)?;
        check_lifetime(claims.iat, claims.exp)?;
        claims.expires_at()?;
        if claims.user_id.is_empty() {
            claims.user_id = claims.sub.clone();
        }
        Ok(claims)
    }

    /// Verify a refresh token and return its claims.
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        let claims: RefreshClaims = self.decode_checked(token)?;
        check_lifetime(claims.iat, claims.exp)?;
        Ok(claims)
    }

    /// Re-issue both tokens for the refresh token's subject.
    ///
    /// The refresh token carries no identity enrichment, so the new access
    /// token holds only the user id. Use [`JwtService::refresh_access_token_with`]
    /// to restore username, email, roles and metadata from a lookup.
    pub fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenPair, TokenError> {
        self.refresh_access_token_with(refresh_token, |_| None)
    }

    /// Re-issue both tokens, enriching the access token with `resolve(subject)`.
    ///
    /// When `resolve` returns `None` the bare subject is used. A resolved
    /// identity always keeps the refresh token's subject as its user id.
    pub fn refresh_access_token_with<F>(
        &self,
        refresh_token: &str,
        resolve: F,
    ) -> Result<TokenPair, TokenError>
    where
        F: FnOnce(&str) -> Option<Identity>,
    {
        let refresh = self.validate_refresh_token(refresh_token)?;

        let identity = match resolve(&refresh.sub) {
            Some(identity) => Identity {
                user_id: refresh.sub.clone(),
                ..identity
            },
            None => Identity::new(refresh.sub.clone()),
        };

        self.issue_token_pair(&identity)
    }

    // region:    --- Signing

    fn sign_access_token(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims::new(identity, &self.config.issuer, issued_at, self.config.access_ttl)?;
        self.sign(&claims)
    }

    fn sign_refresh_token(
        &self,
        user_id: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims =
            RefreshClaims::new(user_id, &self.config.issuer, issued_at, self.config.refresh_ttl)?;
        self.sign(&claims)
    }

    fn sign_token_pair(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        let access = Claims::new(identity, &self.config.issuer, issued_at, self.config.access_ttl)?;

        Ok(TokenPair {
            access_token: self.sign(&access)?,
            refresh_token: self.sign_refresh_token(&identity.user_id, issued_at)?,
            // Second precision, matching the `exp` claim.
            expires_at: access.expires_at()?,
            token_type: TokenPair::BEARER.to_string(),
        })
    }

    fn sign<T: serde::Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    // endregion: --- Signing

    /// Check signature and registered claims on the raw payload, then type it.
    fn decode_checked<T: DeserializeOwned>(&self, token: &str) -> Result<T, TokenError> {
        let data = decode::<Map<String, Value>>(token, &self.decoding_key, &self.validation)?;
        serde_json::from_value(Value::Object(data.claims))
            .map_err(|e| TokenError::MalformedClaims(e.to_string()))
    }
}

fn check_lifetime(iat: i64, exp: i64) -> Result<(), TokenError> {
    if exp <= iat {
        return Err(TokenError::MalformedClaims(
            "expiration must be after issued-at".to_string(),
        ));
    }
    Ok(())
}
