//! # Utilities Library
//!
//! Shared helpers for environment variables, base64url, time, and
//! declarative request validation.

pub mod b64;
pub mod envs;
pub mod time;
pub mod validation;

// Re-export commonly used functions
pub use b64::{b64u_decode, b64u_encode};
pub use envs::{get_env, get_env_bool_or, get_env_list, get_env_or, get_env_parse_or};
pub use time::{format_time, now_utc, unix_to_utc};
pub use validation::{FieldError, Rule, Validate, ValidationErrors, Validator};
