//! # Validation Utilities
//!
//! Declarative, per-request-type validation.
//!
//! Each request type lists its constraints explicitly through [`Validator`]
//! and implements [`Validate`]. Failures are collected per field as
//! [`FieldError`]s so handlers can return every problem at once.
//!
//! ```rust
//! use lib_utils::validation::{Rule, Validate, ValidationErrors, Validator};
//!
//! struct SignupRequest {
//!     email: String,
//!     role: String,
//! }
//!
//! impl Validate for SignupRequest {
//!     fn validate(&self) -> Result<(), ValidationErrors> {
//!         Validator::new()
//!             .field("email", &self.email, &[Rule::Required, Rule::Email])
//!             .field("role", &self.role, &[Rule::OneOf(&["user", "admin"])])
//!             .finish()
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single constraint applied to a string field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Value must not be empty or whitespace.
    Required,
    /// Value must look like `local@domain.tld`.
    Email,
    /// Minimum length in characters.
    MinLength(usize),
    /// Maximum length in characters.
    MaxLength(usize),
    /// Value must equal one of the listed options.
    OneOf(&'static [&'static str]),
}

impl Rule {
    /// Check `value` against this rule, returning the user-facing message on failure.
    ///
    /// Only [`Rule::Required`] rejects an empty value; the other rules skip it so
    /// optional fields can still carry format constraints.
    fn check(&self, value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            return match self {
                Rule::Required => Err("This field is required".to_string()),
                _ => Ok(()),
            };
        }

        match self {
            Rule::Required => Ok(()),
            Rule::Email if is_email(value) => Ok(()),
            Rule::Email => Err("Must be a valid email".to_string()),
            Rule::MinLength(min) if value.chars().count() < *min => {
                Err(format!("Must be at least {} characters", min))
            }
            Rule::MaxLength(max) if value.chars().count() > *max => {
                Err(format!("Must be at most {} characters", max))
            }
            Rule::MinLength(_) | Rule::MaxLength(_) => Ok(()),
            Rule::OneOf(options) if options.iter().any(|o| *o == value) => Ok(()),
            Rule::OneOf(options) => Err(format!("Must be one of: {}", options.join(", "))),
        }
    }
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every field failure found while validating a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// First failure recorded for `field`, if any.
    pub fn for_field(&self, field: &str) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for ValidationErrors {}

/// Types that know their own constraint list.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Collects field errors from a sequence of constraint checks.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `rules` in order to `value`; the first failing rule is reported.
    pub fn field(mut self, name: &str, value: &str, rules: &[Rule]) -> Self {
        if let Some(message) = rules.iter().find_map(|rule| rule.check(value).err()) {
            self.errors.push(FieldError {
                field: name.to_string(),
                message,
            });
        }
        self
    }

    /// Like [`Validator::field`], but an absent value is always accepted.
    pub fn optional(self, name: &str, value: Option<&str>, rules: &[Rule]) -> Self {
        match value {
            Some(value) => self.field(name, value, rules),
            None => self,
        }
    }

    /// Record `message` for `name` unless `ok` holds.
    pub fn check(mut self, name: &str, ok: bool, message: &str) -> Self {
        if !ok {
            self.errors.push(FieldError {
                field: name.to_string(),
                message: message.to_string(),
            });
        }
        self
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}
