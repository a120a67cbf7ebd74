//! # HTTP Handlers
//!
//! Built-in endpoints mounted by [`create_router`](crate::server::create_router).
//!
//! - `GET  /health` - [`health::health`]
//! - `POST /api/auth/refresh` - [`auth::refresh`]
//! - `GET  /api/auth/me` - [`auth::me`] (requires a Bearer token)

pub mod auth;
pub mod health;

use axum::http::Uri;
use lib_core::AppError;
use tracing::info;

/// Fallback for unmatched routes.
pub async fn fallback(uri: Uri) -> AppError {
    info!("[404 HANDLER] Unmatched route: {}", uri.path());
    AppError::NotFound("Route not found".to_string())
}
