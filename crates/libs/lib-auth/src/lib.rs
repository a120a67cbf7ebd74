//! # Authentication Library
//!
//! JWT issuance/validation/refresh and password helpers.
//!
//! Everything here is stateless: a [`JwtService`] holds only its immutable
//! keys and configuration and can be shared across request handlers behind
//! an `Arc`.

pub mod pwd;
pub mod token;

// Re-export commonly used types
pub use pwd::{
    constant_time_eq, generate_secure_token, hash_password, is_strong_password, verify_password,
    PasswordError,
};
pub use token::{Claims, Identity, JwtConfig, JwtService, RefreshClaims, TokenError, TokenPair};
