//! # Web Library
//!
//! Axum middleware, built-in handlers, router/server setup, and a JSON HTTP
//! client that speaks the response envelope.

pub mod client;
pub mod handlers;
pub mod middleware;
pub mod server;

pub use client::{ApiClient, ApiClientBuilder};
pub use server::{create_router, init_tracing, jwt_config, start_server, AppState};
