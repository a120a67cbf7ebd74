//! # Response Envelope
//!
//! Every response body has the shape:
//!
//! ```text
//! { "success": true,  "data": { ... } }
//! { "success": false, "error": { "code": "...", "message": "...", "details": [ ... ] } }
//! ```
//!
//! `data`, `error` and `details` are omitted when absent.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lib_utils::ValidationErrors;
use serde::{Deserialize, Serialize};

/// JSON envelope wrapping every response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    // No `default` here: it would require `T: Default` to decode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

/// Error part of the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable machine-readable code, e.g. `UNAUTHORIZED`
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Field-level validation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ValidationErrors>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: ErrorBody) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

impl ApiResponse<()> {
    /// Failure envelope with a bare code and message.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::failure(ErrorBody {
            code: code.into(),
            message: message.into(),
            details: None,
        })
    }
}

/// Success envelopes answer `200 OK`; pair with a status tuple for anything else.
impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
