//! # Environment Variables
//!
//! Typed accessors for environment variables with defaults.
//!
//! Unlike a silent fallback, a variable that is *set* but cannot be parsed is
//! reported as [`Error::WrongFormat`] so misconfiguration fails at startup.

use std::env;
use std::str::FromStr;

/// Get a required environment variable.
pub fn get_env(name: &'static str) -> Result<String, Error> {
    match env::var(name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(Error::MissingEnv(name)),
    }
}

/// Get an environment variable, or `default` when unset or empty.
pub fn get_env_or(name: &'static str, default: &str) -> String {
    get_env(name).unwrap_or_else(|_| default.to_string())
}

/// Get and parse an environment variable, or `default` when unset.
pub fn get_env_parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, Error> {
    match get_env(name) {
        Ok(val) => val.trim().parse::<T>().map_err(|_| Error::WrongFormat(name)),
        Err(_) => Ok(default),
    }
}

/// Get a boolean flag. Accepts `true/false`, `1/0`, `yes/no`, `on/off`.
pub fn get_env_bool_or(name: &'static str, default: bool) -> Result<bool, Error> {
    let Ok(val) = get_env(name) else {
        return Ok(default);
    };

    match val.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(Error::WrongFormat(name)),
    }
}

/// Get a comma-separated list. Blank items are dropped; unset yields an empty list.
pub fn get_env_list(name: &'static str) -> Vec<String> {
    get_env(name)
        .map(|val| {
            val.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

// region:    --- Error
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    MissingEnv(&'static str),
    WrongFormat(&'static str),
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::MissingEnv(name) => write!(fmt, "{name} must be set in environment"),
            Error::WrongFormat(name) => write!(fmt, "{name} has an invalid format"),
        }
    }
}

impl std::error::Error for Error {}
// endregion: --- Error

#[cfg(test)]
mod tests {
    use super::*;

    // Each test owns distinct variable names; the process environment is shared.

    #[test]
    fn test_missing_env_uses_default() {
        assert_eq!(get_env("LIB_UTILS_TEST_UNSET"), Err(Error::MissingEnv("LIB_UTILS_TEST_UNSET")));
        assert_eq!(get_env_or("LIB_UTILS_TEST_UNSET", "fallback"), "fallback");
        assert_eq!(get_env_parse_or("LIB_UTILS_TEST_UNSET", 42u16), Ok(42));
        assert_eq!(get_env_bool_or("LIB_UTILS_TEST_UNSET", true), Ok(true));
        assert!(get_env_list("LIB_UTILS_TEST_UNSET").is_empty());
    }

    #[test]
    fn test_parse_failure_is_reported() {
        env::set_var("LIB_UTILS_TEST_PORT", "eighty");
        assert_eq!(
            get_env_parse_or::<u16>("LIB_UTILS_TEST_PORT", 8080),
            Err(Error::WrongFormat("LIB_UTILS_TEST_PORT"))
        );

        env::set_var("LIB_UTILS_TEST_FLAG", "maybe");
        assert_eq!(
            get_env_bool_or("LIB_UTILS_TEST_FLAG", false),
            Err(Error::WrongFormat("LIB_UTILS_TEST_FLAG"))
        );
    }

    #[test]
    fn test_list_trims_and_skips_blanks() {
        env::set_var("LIB_UTILS_TEST_LIST", " http://a.test , ,http://b.test,");
        assert_eq!(
            get_env_list("LIB_UTILS_TEST_LIST"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn test_bool_spellings() {
        env::set_var("LIB_UTILS_TEST_BOOL_ON", "On");
        env::set_var("LIB_UTILS_TEST_BOOL_OFF", "0");
        assert_eq!(get_env_bool_or("LIB_UTILS_TEST_BOOL_ON", false), Ok(true));
        assert_eq!(get_env_bool_or("LIB_UTILS_TEST_BOOL_OFF", true), Ok(false));
    }
}
