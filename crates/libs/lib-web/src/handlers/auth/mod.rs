//! # Authentication Handlers
//!
//! Token endpoints. There is no login here: issuing the first token pair
//! needs a credential store, which belongs to the service embedding this
//! library. It calls [`JwtService::issue_token_pair`] after checking the
//! password with [`lib_auth::verify_password`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use axum::{routing::{get, post}, Router};
//! use lib_web::{handlers::auth::{me, refresh}, AppState};
//!
//! fn routes() -> Router<AppState> {
//!     Router::new()
//!         .route("/api/auth/refresh", post(refresh))
//!         .route("/api/auth/me", get(me))
//! }
//! ```

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    Extension,
};
use lib_auth::{Claims, JwtService, TokenPair};
use lib_core::{
    dto::{MeResponse, RefreshRequest},
    ApiResponse, AppError, Result,
};
use lib_utils::{format_time, Validate};
use tracing::{info, instrument, warn};

use crate::middleware::auth_error;

/// Exchange a refresh token for a new token pair.
///
/// The new access token carries the subject only; enrichment fields from
/// the original login are not restored.
///
/// # Errors
///
/// - `400 VALIDATION_ERROR` when `refresh_token` is missing or not a compact JWT
/// - `401 UNAUTHORIZED` "token expired" / "invalid token"
#[instrument(skip_all)]
pub async fn refresh(
    State(jwt): State<Arc<JwtService>>,
    Json(req): Json<RefreshRequest>,
) -> Result<ApiResponse<TokenPair>> {
    req.validate()?;

    let pair = jwt.refresh_access_token(req.refresh_token.trim()).map_err(|e| {
        warn!("[REFRESH] Rejected refresh token: {}", e);
        auth_error(e)
    })?;

    info!("[REFRESH] Token pair re-issued, access expires {}", format_time(pair.expires_at));

    Ok(ApiResponse::ok(pair))
}

/// Identity carried by the caller's access token.
pub async fn me(Extension(claims): Extension<Claims>) -> Result<ApiResponse<MeResponse>> {
    let expires_at = claims
        .expires_at()
        .map_err(|e| AppError::Internal(format!("unrepresentable expiry: {}", e)))?;

    Ok(ApiResponse::ok(MeResponse {
        user_id: claims.user_id,
        username: claims.username,
        email: claims.email,
        roles: claims.roles,
        metadata: claims.metadata,
        expires_at: format_time(expires_at),
    }))
}

#[cfg(test)]
mod tests;
