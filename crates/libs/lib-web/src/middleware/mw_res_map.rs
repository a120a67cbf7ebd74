//! # Response Mapping Middleware
//!
//! Rewrites error responses that are not already JSON into the standard
//! envelope, keeping their status and headers.
//!
//! Handlers returning [`AppError`](lib_core::AppError) already produce the
//! envelope. This catches what the framework produces on its own: extractor
//! rejections (bad JSON, wrong content type), `405 Method Not Allowed`, and
//! bare status codes.

use axum::{
    body::to_bytes,
    extract::Request,
    http::header::{CONTENT_LENGTH, CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use lib_core::{error::code_for_status, ApiResponse};
use tracing::debug;

/// Upper bound on a rejection body read back as the error message
const MAX_MESSAGE_BYTES: usize = 16 * 1024;

/// Response mapping middleware.
pub async fn map_res(req: Request, next: Next) -> Response {
    let res = next.run(req).await;

    let status = res.status();
    if !(status.is_client_error() || status.is_server_error()) || is_json(&res) {
        return res;
    }

    let (parts, body) = res.into_parts();
    let bytes = to_bytes(body, MAX_MESSAGE_BYTES).await.unwrap_or_default();
    let text = String::from_utf8_lossy(&bytes).trim().to_string();
    let message = if text.is_empty() {
        status.canonical_reason().unwrap_or("Request failed").to_string()
    } else {
        text
    };

    debug!("[RESPONSE] Wrapping bare {} response: {}", status, message);

    let mut mapped =
        (status, Json(ApiResponse::error(code_for_status(status), message))).into_response();
    for (name, value) in parts.headers.iter() {
        if name != CONTENT_TYPE && name != CONTENT_LENGTH {
            mapped.headers_mut().append(name.clone(), value.clone());
        }
    }

    mapped
}

fn is_json(res: &Response) -> bool {
    res.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"))
}
