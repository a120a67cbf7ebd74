//! # Password Helpers
//!
//! Argon2 hashing and verification, a password strength check, secure random
//! tokens, and constant-time comparison.

use argon2::{
    password_hash::{
        rand_core::{OsRng, RngCore},
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use lib_utils::b64u_encode;
use thiserror::Error;

/// Minimum password length accepted by [`hash_password`].
pub const MIN_PASSWORD_LEN: usize = 8;

const SPECIAL_CHARS: &str = "!@#$%^&*()_+{}[]|\\:;\"'<>,.?/~`-=";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordError {
    #[error("Password must be at least 8 characters long")]
    TooShort,

    #[error("Failed to hash password: {0}")]
    Hash(String),

    #[error("Failed to parse hash: {0}")]
    MalformedHash(String),
}

/// Hash a password using the Argon2 algorithm.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PasswordError::TooShort);
    }

    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Verify a plaintext password against an Argon2 hash.
///
/// A mismatch is `Ok(false)`; only an unparseable hash is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// At least 8 characters with an uppercase letter, a lowercase letter, a
/// digit and a special character.
pub fn is_strong_password(password: &str) -> bool {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return false;
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| SPECIAL_CHARS.contains(c));

    has_upper && has_lower && has_digit && has_special
}

/// `len` random bytes from the OS generator, base64url encoded.
pub fn generate_secure_token(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    b64u_encode(bytes)
}

/// Compare two strings without short-circuiting on the first differing byte.
///
/// Length is not hidden.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_utils::b64u_decode;

    #[test]
    fn test_password_hashing() {
        let password = "TestPassword123!";
        let hash =
            hash_password(password).expect("Password hashing should succeed for valid password");

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(password, &hash).expect("Verification should run"));
        assert!(!verify_password("WrongPassword", &hash).expect("Verification should run"));
    }

    #[test]
    fn test_password_too_short() {
        assert_eq!(hash_password("short"), Err(PasswordError::TooShort));
        assert_eq!(
            PasswordError::TooShort.to_string(),
            "Password must be at least 8 characters long"
        );
    }

    #[test]
    fn test_verify_with_malformed_hash() {
        assert!(matches!(
            verify_password("whatever1", "not-a-phc-string"),
            Err(PasswordError::MalformedHash(_))
        ));
    }

    #[test]
    fn test_password_strength() {
        assert!(is_strong_password("Str0ng!pass"));
        assert!(!is_strong_password("S0!a"));
        assert!(!is_strong_password("nouppercase1!"));
        assert!(!is_strong_password("NOLOWERCASE1!"));
        assert!(!is_strong_password("NoDigits!!"));
        assert!(!is_strong_password("NoSpecial123"));
    }

    #[test]
    fn test_secure_token() {
        let a = generate_secure_token(32);
        let b = generate_secure_token(32);

        assert_ne!(a, b);
        assert_eq!(b64u_decode(&a).unwrap().len(), 32);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "abcd"));
        assert!(constant_time_eq("", ""));
    }
}
