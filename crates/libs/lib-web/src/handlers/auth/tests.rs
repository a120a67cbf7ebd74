//! # Auth Handler Tests
//!
//! Drive the full router so middleware and handlers are exercised together.

use super::*;
use crate::server::{create_router, AppState};
use axum::body::Body;
use axum::http::{header::AUTHORIZATION, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use lib_auth::Identity;
use lib_core::Config;
use serde_json::Value;
use tower::ServiceExt;

/// Create test config
fn test_config() -> Config {
    Config {
        jwt_secret: "test-secret-key-must-be-at-least-32-characters-long!".to_string(),
        ..Config::default()
    }
}

/// Create test app with the built-in routes only
fn setup() -> (Router, AppState) {
    let state = AppState::new(test_config()).expect("test config should be valid");
    (create_router(state.clone(), Router::new()), state)
}

async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn refresh_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/auth/refresh")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn me_request(token: &str) -> Request<Body> {
    Request::builder()
        .uri("/api/auth/me")
        .header(AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_me_returns_token_identity() {
    // Arrange
    let (app, state) = setup();
    let identity = Identity::new("u1")
        .with_username("alice")
        .with_email("alice@example.com")
        .with_roles(["admin"])
        .with_metadata("tenant", "acme");
    let token = state.jwt.issue_access_token(&identity).unwrap();

    // Act
    let response = app.oneshot(me_request(&token)).await.unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user_id"], "u1");
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert_eq!(body["data"]["roles"][0], "admin");
    assert_eq!(body["data"]["metadata"]["tenant"], "acme");
    assert!(body["data"]["expires_at"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_me_with_refresh_token_reports_subject() {
    let (app, state) = setup();
    let refresh = state.jwt.issue_refresh_token("u1").unwrap();

    let response = app.oneshot(me_request(&refresh)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["user_id"], "u1");
    assert_eq!(body["data"]["roles"], serde_json::json!([]));
}

#[tokio::test]
async fn test_me_requires_token() {
    let (app, _) = setup();

    let response = app
        .oneshot(Request::builder().uri("/api/auth/me").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_refresh_issues_new_pair() {
    let (app, state) = setup();
    let pair = state
        .jwt
        .issue_token_pair(&Identity::new("u1").with_roles(["admin"]))
        .unwrap();

    let response = app
        .clone()
        .oneshot(refresh_request(&format!(r#"{{"refresh_token":"{}"}}"#, pair.refresh_token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["token_type"], "Bearer");

    let access = body["data"]["access_token"].as_str().unwrap();
    let claims = state.jwt.validate_token(access).unwrap();
    assert_eq!(claims.user_id, "u1");
    // Enrichment is not carried by refresh tokens.
    assert!(claims.roles.is_empty());

    let response = app.oneshot(me_request(access)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_rejects_garbage() {
    let (app, _) = setup();

    let response = app
        .oneshot(refresh_request(r#"{"refresh_token":"a.b.c"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"]["message"], "invalid token");
}

#[tokio::test]
async fn test_refresh_validation_error() {
    let (app, _) = setup();

    let response = app.oneshot(refresh_request(r#"{"refresh_token":""}"#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"][0]["field"], "refresh_token");
    assert_eq!(body["error"]["details"][0]["message"], "This field is required");
}

#[tokio::test]
async fn test_refresh_with_malformed_json() {
    let (app, _) = setup();

    let response = app.oneshot(refresh_request("{oops")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_health_and_unknown_route() {
    let (app, _) = setup();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "ok");

    let response = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["error"]["message"], "Route not found");
}
