//! # Role Check Middleware
//!
//! Authorization stage that runs after [`require_auth`](super::require_auth)
//! and lets a request through only if the caller holds at least one of the
//! required roles.
//!
//! ## Usage
//!
//! Layers added later wrap earlier ones, so `require_auth` goes on last:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum::{middleware::from_fn_with_state, routing::delete, Router};
//! use lib_auth::JwtService;
//! use lib_web::middleware::{require_auth, require_roles, RequiredRoles};
//!
//! async fn purge() {}
//!
//! fn admin_routes(jwt: Arc<JwtService>) -> Router {
//!     Router::new()
//!         .route("/admin/cache", delete(purge))
//!         .route_layer(from_fn_with_state(RequiredRoles::new(["admin"]), require_roles))
//!         .route_layer(from_fn_with_state(jwt, require_auth))
//! }
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use lib_auth::Claims;
use lib_core::AppError;
use tracing::{debug, warn};

/// Roles accepted by a [`require_roles`] layer. Any one of them is enough.
#[derive(Debug, Clone)]
pub struct RequiredRoles(Arc<[String]>);

impl RequiredRoles {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(roles.into_iter().map(Into::into).collect())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Role check middleware.
///
/// - No `Claims` in extensions: `401` "No role information found"
/// - No overlap between required and held roles: `403` "Insufficient permissions"
///
/// An empty required set never matches, so it forbids everyone.
pub async fn require_roles(
    State(required): State<RequiredRoles>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = req.extensions().get::<Claims>().ok_or_else(|| {
        warn!("[AUTH] Role check without authenticated claims");
        AppError::Unauthorized("No role information found".to_string())
    })?;

    if !claims.has_any_role(required.as_slice()) {
        warn!(
            "[AUTH] User {} denied: holds {:?}, needs one of {:?}",
            claims.user_id,
            claims.roles,
            required.as_slice()
        );
        return Err(AppError::Forbidden("Insufficient permissions".to_string()));
    }

    debug!("[AUTH] Role check passed for user {}", claims.user_id);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::require_auth;
    use crate::middleware::test_support::{body_json, test_jwt};
    use axum::{
        body::Body,
        http::{header::AUTHORIZATION, Request, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Router,
    };
    use lib_auth::{Identity, JwtService};
    use tower::ServiceExt;

    fn app(jwt: Arc<JwtService>, roles: RequiredRoles) -> Router {
        Router::new()
            .route("/admin", get(|| async { "ok" }))
            .route_layer(from_fn_with_state(roles, require_roles))
            .route_layer(from_fn_with_state(jwt, require_auth))
    }

    async fn call_as(holding: &[&str], required: RequiredRoles) -> Response {
        let jwt = test_jwt();
        let token = jwt
            .issue_access_token(&Identity::new("u1").with_roles(holding.iter().copied()))
            .unwrap();

        app(jwt, required)
            .oneshot(
                Request::builder()
                    .uri("/admin")
                    .header(AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_matching_role_passes() {
        let response = call_as(&["user", "admin"], RequiredRoles::new(["admin"])).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_any_of_several_roles_passes() {
        let response = call_as(&["editor"], RequiredRoles::new(["admin", "editor"])).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_role_is_forbidden() {
        let response = call_as(&["user"], RequiredRoles::new(["admin"])).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "FORBIDDEN");
        assert_eq!(body["error"]["message"], "Insufficient permissions");
    }

    #[tokio::test]
    async fn test_empty_requirement_forbids_everyone() {
        let response = call_as(&["admin"], RequiredRoles::new(Vec::<String>::new())).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = call_as(&[], RequiredRoles::new(Vec::<String>::new())).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_without_auth_stage() {
        let app = Router::new()
            .route("/admin", get(|| async { "ok" }))
            .route_layer(from_fn_with_state(RequiredRoles::new(["admin"]), require_roles));

        let response = app
            .oneshot(Request::builder().uri("/admin").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"]["message"], "No role information found");
    }
}
