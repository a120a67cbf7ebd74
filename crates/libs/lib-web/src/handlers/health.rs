//! Liveness probe.

use lib_core::ApiResponse;
use lib_utils::{format_time, now_utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
}

/// `GET /health`
pub async fn health() -> ApiResponse<HealthStatus> {
    ApiResponse::ok(HealthStatus {
        status: "ok".to_string(),
        timestamp: format_time(now_utc()),
    })
}
