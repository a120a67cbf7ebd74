//! # Authentication Middleware
//!
//! Axum middleware for JWT token validation.
//!
//! This middleware extracts and validates the token from the `Authorization`
//! header, then injects the caller's [`Claims`] into the request extensions.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum::{middleware::from_fn_with_state, routing::get, Extension, Router};
//! use lib_auth::{Claims, JwtService};
//! use lib_web::middleware::require_auth;
//!
//! async fn protected_handler(Extension(claims): Extension<Claims>) -> String {
//!     format!("Hello, user {}!", claims.user_id)
//! }
//!
//! fn routes(jwt: Arc<JwtService>) -> Router {
//!     Router::new()
//!         .route("/protected", get(protected_handler))
//!         .route_layer(from_fn_with_state(jwt, require_auth))
//! }
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use lib_auth::{JwtService, TokenError};
use lib_core::AppError;
use tracing::{debug, warn};

/// Authentication middleware that validates JWT tokens.
///
/// # Behavior
///
/// - **Valid token**: continues with `Claims` in extensions
/// - **No header**: `401` "Authorization header required"
/// - **Not `Bearer <token>`**: `401` "Invalid authorization format"
/// - **Expired token**: `401` "token expired"
/// - **Any other defect**: `401` "invalid token"
pub async fn require_auth(
    State(jwt): State<Arc<JwtService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = req.headers().get(AUTHORIZATION).ok_or_else(|| {
        warn!("[AUTH] Missing Authorization header");
        AppError::Unauthorized("Authorization header required".to_string())
    })?;

    let token = header
        .to_str()
        .ok()
        .and_then(bearer_token)
        .ok_or_else(|| {
            warn!("[AUTH] Invalid Authorization header format");
            AppError::Unauthorized("Invalid authorization format".to_string())
        })?;

    let claims = jwt.validate_token(token).map_err(|e| {
        warn!("[AUTH] JWT validation failed: {}", e);
        auth_error(e)
    })?;

    debug!("[AUTH] Authenticated user: {} (roles: {:?})", claims.user_id, claims.roles);

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Token from a `Bearer <token>` header value: exactly two space separated
/// parts, the first being `Bearer`.
fn bearer_token(value: &str) -> Option<&str> {
    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}

/// Map a token failure to what the client sees.
///
/// Expiry is reported as such; every other validation defect is a bare
/// "invalid token". Signing or key problems are server errors.
pub fn auth_error(err: TokenError) -> AppError {
    match err {
        TokenError::Expired => AppError::Unauthorized("token expired".to_string()),
        TokenError::Invalid(_)
        | TokenError::WrongSigningMethod
        | TokenError::MalformedClaims(_) => AppError::Unauthorized("invalid token".to_string()),
        TokenError::Signing(_) | TokenError::Config(_) => AppError::Internal(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::test_support::{body_json, test_jwt};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Extension, Router,
    };
    use lib_auth::{Claims, Identity, JwtConfig};
    use tower::ServiceExt;

    fn app(jwt: Arc<JwtService>) -> Router {
        Router::new()
            .route(
                "/protected",
                get(|Extension(claims): Extension<Claims>| async move { claims.user_id }),
            )
            .route_layer(from_fn_with_state(jwt, require_auth))
    }

    async fn call(jwt: Arc<JwtService>, authorization: Option<&str>) -> axum::response::Response {
        let mut req = Request::builder().uri("/protected");
        if let Some(value) = authorization {
            req = req.header(AUTHORIZATION, value);
        }
        app(jwt).oneshot(req.body(Body::empty()).unwrap()).await.unwrap()
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer abc"), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer a b"), None);
        assert_eq!(bearer_token("Basic abc"), None);
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let jwt = test_jwt();
        let token = jwt.issue_access_token(&Identity::new("u1")).unwrap();

        let response = call(jwt, Some(&format!("Bearer {}", token))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"u1");
    }

    #[tokio::test]
    async fn test_missing_header() {
        let response = call(test_jwt(), None).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
        assert_eq!(body["error"]["message"], "Authorization header required");
    }

    #[tokio::test]
    async fn test_malformed_header() {
        for value in ["Token abc", "Bearer", "Bearer a b"] {
            let response = call(test_jwt(), Some(value)).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            let body = body_json(response).await;
            assert_eq!(body["error"]["message"], "Invalid authorization format");
        }
    }

    #[tokio::test]
    async fn test_expired_token() {
        let jwt = test_jwt();
        let token = expired_token(&jwt);

        let response = call(jwt, Some(&format!("Bearer {}", token))).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"]["message"], "token expired");
    }

    #[tokio::test]
    async fn test_foreign_token_is_invalid() {
        let other = JwtService::new(JwtConfig {
            secret: "another-secret-that-is-also-32-bytes-long".to_string(),
            ..JwtConfig::default()
        });
        let token = other.issue_access_token(&Identity::new("u1")).unwrap();

        let response = call(test_jwt(), Some(&format!("Bearer {}", token))).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"]["message"], "invalid token");
    }

    #[test]
    fn test_auth_error_mapping() {
        assert!(matches!(
            auth_error(TokenError::Expired),
            AppError::Unauthorized(m) if m == "token expired"
        ));
        assert!(matches!(
            auth_error(TokenError::WrongSigningMethod),
            AppError::Unauthorized(m) if m == "invalid token"
        ));
        assert!(matches!(auth_error(TokenError::Signing("x".into())), AppError::Internal(_)));
    }

    /// Hand-built HS256 token whose `exp` is in the past but after `iat`.
    fn expired_token(jwt: &JwtService) -> String {
        use jsonwebtoken::{encode, EncodingKey, Header};
        let now = chrono::Utc::now().timestamp();
        let claims = serde_json::json!({
            "user_id": "u1",
            "iss": jwt.config().issuer,
            "sub": "u1",
            "iat": now - 3600,
            "exp": now - 60,
        });
        let key = EncodingKey::from_secret(jwt.config().secret.as_bytes());
        encode(&Header::default(), &claims, &key).unwrap()
    }
}
