//! # Centralized Error Handling
//!
//! [`AppError`] is the error type every service returns from handlers. Each
//! variant belongs to a fixed category with a stable machine-readable code
//! and HTTP status, and renders as the JSON envelope:
//!
//! ```text
//! { "success": false, "error": { "code": "NOT_FOUND", "message": "User not found" } }
//! ```
//!
//! ## Error Categories
//!
//! | variant          | code               | status |
//! |------------------|--------------------|--------|
//! | `Validation`     | `VALIDATION_ERROR` | 400    |
//! | `BadRequest`     | `BAD_REQUEST`      | 400    |
//! | `Unauthorized`   | `UNAUTHORIZED`     | 401    |
//! | `Forbidden`      | `FORBIDDEN`        | 403    |
//! | `NotFound`       | `NOT_FOUND`        | 404    |
//! | `Duplicated`     | `DUPLICATED`       | 409    |
//! | `Internal`       | `INTERNAL_ERROR`   | 500    |
//! | `Config`         | `INTERNAL_ERROR`   | 500    |
//! | `External`       | `EXTERNAL_ERROR`   | 502    |
//! | `Timeout`        | `TIMEOUT`          | 504    |
//!
//! Server-side variants keep their cause for the logs and show the client a
//! generic message.
//!
//! ## Usage Example
//!
//! ```rust
//! use lib_core::error::{AppError, Result};
//!
//! fn find_user(id: &str) -> Result<String> {
//!     if id.is_empty() {
//!         return Err(AppError::NotFound("User not found".to_string()));
//!     }
//!     Ok(id.to_string())
//! }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lib_utils::ValidationErrors;
use thiserror::Error;

use crate::dto::{ApiResponse, ErrorBody};

/// Convenience type alias for `Result<T, AppError>`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application-wide error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Field-level validation failures.
    ///
    /// **HTTP Status**: 400 Bad Request
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Malformed request that is not tied to a field.
    ///
    /// **HTTP Status**: 400 Bad Request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid credentials.
    ///
    /// **HTTP Status**: 401 Unauthorized
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    ///
    /// **HTTP Status**: 403 Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Requested resource not found.
    ///
    /// **HTTP Status**: 404 Not Found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource already exists.
    ///
    /// **HTTP Status**: 409 Conflict
    #[error("Duplicated: {0}")]
    Duplicated(String),

    /// Unexpected failure inside this service.
    ///
    /// **HTTP Status**: 500 Internal Server Error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Configuration error during startup or environment loading.
    ///
    /// **HTTP Status**: 500 Internal Server Error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A downstream service failed.
    ///
    /// **HTTP Status**: 502 Bad Gateway
    #[error("External service error: {0}")]
    External(String),

    /// A downstream service did not answer in time.
    ///
    /// **HTTP Status**: 504 Gateway Timeout
    #[error("Timeout: {0}")]
    Timeout(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Duplicated(_) => StatusCode::CONFLICT,
            AppError::Internal(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::External(_) => StatusCode::BAD_GATEWAY,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Duplicated(_) => "DUPLICATED",
            AppError::Internal(_) | AppError::Config(_) => "INTERNAL_ERROR",
            AppError::External(_) => "EXTERNAL_ERROR",
            AppError::Timeout(_) => "TIMEOUT",
        }
    }

    /// Get a user-friendly error message.
    ///
    /// For server-side errors, returns a generic message to avoid exposing implementation details.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(_) => "Validation failed".to_string(),
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Duplicated(msg) => msg.clone(),
            AppError::Internal(_) | AppError::Config(_) => "An internal error occurred".to_string(),
            AppError::External(_) => "Service temporarily unavailable".to_string(),
            AppError::Timeout(_) => "Upstream service timed out".to_string(),
        }
    }

    /// Envelope body for this error.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code().to_string(),
            message: self.user_message(),
            details: match self {
                AppError::Validation(errors) => Some(errors.clone()),
                _ => None,
            },
        }
    }

    /// Rebuild an error from an envelope body, e.g. one received from another service.
    ///
    /// Unknown codes become [`AppError::External`].
    pub fn from_body(body: ErrorBody) -> Self {
        let ErrorBody { code, message, details } = body;
        match code.as_str() {
            "VALIDATION_ERROR" => AppError::Validation(details.unwrap_or_default()),
            "BAD_REQUEST" | "METHOD_NOT_ALLOWED" => AppError::BadRequest(message),
            "UNAUTHORIZED" => AppError::Unauthorized(message),
            "FORBIDDEN" => AppError::Forbidden(message),
            "NOT_FOUND" => AppError::NotFound(message),
            "DUPLICATED" => AppError::Duplicated(message),
            "INTERNAL_ERROR" => AppError::Internal(message),
            "TIMEOUT" => AppError::Timeout(message),
            _ => AppError::External(format!("{}: {}", code, message)),
        }
    }

    /// Best-fitting variant for a bare HTTP status.
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
            StatusCode::FORBIDDEN => AppError::Forbidden(message),
            StatusCode::NOT_FOUND => AppError::NotFound(message),
            StatusCode::CONFLICT => AppError::Duplicated(message),
            StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE => {
                AppError::External(message)
            }
            StatusCode::GATEWAY_TIMEOUT | StatusCode::REQUEST_TIMEOUT => AppError::Timeout(message),
            s if s.is_client_error() => AppError::BadRequest(message),
            _ => AppError::Internal(message),
        }
    }
}

/// Envelope code for an arbitrary error status, including ones no
/// [`AppError`] variant produces (e.g. 405 from the router).
pub fn code_for_status(status: StatusCode) -> &'static str {
    match status {
        StatusCode::METHOD_NOT_ALLOWED => "METHOD_NOT_ALLOWED",
        s => AppError::from_status(s, String::new()).code(),
    }
}

/// Implement Axum's `IntoResponse` for automatic error handling.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Full error for server logs; the client only sees `user_message`.
        if status.is_server_error() {
            tracing::error!(code = self.code(), "Server error: {}", self);
        } else {
            tracing::debug!(code = self.code(), "Client error: {}", self);
        }

        (status, Json(ApiResponse::<()>::failure(self.to_body()))).into_response()
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl From<lib_utils::envs::Error> for AppError {
    fn from(err: lib_utils::envs::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_utils::{Rule, Validator};
    use serde_json::{json, Value};

    async fn body_json(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_status_and_code_mapping() {
        let cases = [
            (AppError::BadRequest(String::new()), 400, "BAD_REQUEST"),
            (AppError::Unauthorized(String::new()), 401, "UNAUTHORIZED"),
            (AppError::Forbidden(String::new()), 403, "FORBIDDEN"),
            (AppError::NotFound(String::new()), 404, "NOT_FOUND"),
            (AppError::Duplicated(String::new()), 409, "DUPLICATED"),
            (AppError::Internal(String::new()), 500, "INTERNAL_ERROR"),
            (AppError::Config(String::new()), 500, "INTERNAL_ERROR"),
            (AppError::External(String::new()), 502, "EXTERNAL_ERROR"),
            (AppError::Timeout(String::new()), 504, "TIMEOUT"),
        ];

        for (err, status, code) in cases {
            assert_eq!(err.status_code().as_u16(), status, "{err:?}");
            assert_eq!(err.code(), code);
        }
    }

    #[tokio::test]
    async fn test_unauthorized_envelope() {
        let (status, body) = body_json(AppError::Unauthorized("token expired".to_string())).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body,
            json!({
                "success": false,
                "error": { "code": "UNAUTHORIZED", "message": "token expired" }
            })
        );
    }

    #[tokio::test]
    async fn test_internal_cause_is_hidden() {
        let err = AppError::Internal("db password=hunter2 rejected".to_string());
        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "An internal error occurred");
        assert!(!body.to_string().contains("hunter2"));
    }

    #[tokio::test]
    async fn test_validation_details() {
        let errors = Validator::new()
            .field("email", "nope", &[Rule::Email])
            .finish()
            .unwrap_err();

        let (status, body) = body_json(errors.into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(
            body["error"]["details"],
            json!([{ "field": "email", "message": "Must be a valid email" }])
        );
    }

    #[test]
    fn test_body_round_trip() {
        let original = AppError::Forbidden("Insufficient permissions".to_string());
        let rebuilt = AppError::from_body(original.to_body());

        assert!(matches!(rebuilt, AppError::Forbidden(ref m) if m == "Insufficient permissions"));

        let unknown = AppError::from_body(ErrorBody {
            code: "TEAPOT".to_string(),
            message: "short and stout".to_string(),
            details: None,
        });
        assert!(matches!(unknown, AppError::External(_)));
    }

    #[test]
    fn test_code_for_status() {
        assert_eq!(code_for_status(StatusCode::METHOD_NOT_ALLOWED), "METHOD_NOT_ALLOWED");
        assert_eq!(code_for_status(StatusCode::UNPROCESSABLE_ENTITY), "BAD_REQUEST");
        assert_eq!(code_for_status(StatusCode::NOT_FOUND), "NOT_FOUND");
        assert_eq!(code_for_status(StatusCode::SERVICE_UNAVAILABLE), "EXTERNAL_ERROR");
        assert_eq!(code_for_status(StatusCode::INTERNAL_SERVER_ERROR), "INTERNAL_ERROR");
    }
}
