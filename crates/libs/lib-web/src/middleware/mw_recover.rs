//! # Panic Recovery
//!
//! Turns a panic anywhere below this layer into a `500` envelope. The panic
//! payload is logged and never sent to the client.

use std::any::Any;

use axum::response::{IntoResponse, Response};
use lib_core::AppError;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::error;

type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response;

/// Layer that catches handler panics.
pub fn catch_panic() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(handle_panic as PanicHandler)
}

fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    error!("[PANIC] Handler panicked: {}", detail);

    AppError::Internal(format!("panic: {}", detail)).into_response()
}
