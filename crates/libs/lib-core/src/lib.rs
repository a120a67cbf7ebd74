//! # Core Library
//!
//! Configuration, the error taxonomy, and the DTOs shared by every service,
//! including the JSON response envelope.

pub mod config;
pub mod dto;
pub mod error;

// Re-export commonly used types
pub use config::{Config, LogFormat};
pub use dto::{ApiResponse, ErrorBody};
pub use error::{AppError, Result};
