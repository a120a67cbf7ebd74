//! # Middleware
//!
//! Axum middleware for authentication, authorization, panic recovery, CORS,
//! request stamping, logging and response mapping.
//!
//! ## Modules
//!
//! - **[`mw_auth`]**: JWT authentication middleware
//! - **[`mw_role`]**: Role check, runs after authentication
//! - **[`mw_recover`]**: Panic to `500` envelope
//! - **[`mw_cors`]**: CORS origin allow-list
//! - **[`mw_req_stamp`]**: Request ID and timestamp stamping
//! - **[`mw_logging`]**: Request/response logging
//! - **[`mw_res_map`]**: Bare error responses to envelopes

// region: --- Modules
pub mod mw_auth;
pub mod mw_cors;
pub mod mw_logging;
pub mod mw_recover;
pub mod mw_req_stamp;
pub mod mw_res_map;
pub mod mw_role;
// endregion: --- Modules

// region: --- Re-exports
pub use mw_auth::{auth_error, require_auth};
pub use mw_cors::cors_layer;
pub use mw_logging::log_requests;
pub use mw_recover::catch_panic;
pub use mw_req_stamp::{stamp_req, RequestStamp, REQUEST_ID_HEADER};
pub use mw_res_map::map_res;
pub use mw_role::{require_roles, RequiredRoles};
// endregion: --- Re-exports
