//! # Data Transfer Objects
//!
//! Wire types shared by services: the response envelope every endpoint
//! answers with, and the auth request/response bodies.

pub mod auth;
pub mod envelope;

pub use auth::{MeResponse, RefreshRequest};
pub use envelope::{ApiResponse, ErrorBody};
