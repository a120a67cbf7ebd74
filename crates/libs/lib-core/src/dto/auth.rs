//! # Authentication Data Transfer Objects
//!
//! Request and response bodies for the token endpoints.
//!
//! ## Endpoints Using These DTOs
//!
//! - `POST /api/auth/refresh` - [`RefreshRequest`] -> token pair
//! - `GET  /api/auth/me` - (Bearer token) -> [`MeResponse`]
//!
//! ## Wire Format
//!
//! All DTOs use **snake_case** field names in JSON (default serde behavior),
//! wrapped in the [`ApiResponse`](super::ApiResponse) envelope.
//!
//! ```text
//! POST /api/auth/refresh
//! Content-Type: application/json
//!
//! { "refresh_token": "eyJhbGciOiJIUzI1NiIs..." }
//! ```
//!
//! Response:
//! ```text
//! {
//!   "success": true,
//!   "data": {
//!     "access_token": "eyJ...",
//!     "refresh_token": "eyJ...",
//!     "expires_at": "2025-01-01T12:15:00Z",
//!     "token_type": "Bearer"
//!   }
//! }
//! ```

use lib_utils::{Rule, Validate, ValidationErrors, Validator};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /api/auth/refresh`.
///
/// # Validation Rules
///
/// - `refresh_token` is required
/// - it must have the three dot-separated segments of a compact JWT
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

impl Validate for RefreshRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let token = self.refresh_token.trim();
        Validator::new()
            .field("refresh_token", token, &[Rule::Required])
            .check(
                "refresh_token",
                token.is_empty() || token.split('.').count() == 3,
                "Must be a compact JWT",
            )
            .finish()
    }
}

/// Identity of the caller as read from their access token.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MeResponse {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
    pub metadata: Map<String, Value>,
    /// RFC3339 expiry of the presented token
    pub expires_at: String,
}
