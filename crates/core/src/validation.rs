//! Client-side form validation
//!
//! Validation failures block submission and never reach the server.

use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("valid email regex"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+\d{10,15}$").expect("valid phone regex"));
static TELEGRAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@\w{5,32}$").expect("valid telegram regex"));

/// Minimum password length accepted by the forms
pub const MIN_PASSWORD_LEN: usize = 8;

/// A single field that failed validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Trait for request payloads validated before submission
pub trait Validate {
    /// Returns the first invalid field, if any
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Common validation helpers
pub mod validators {
    use super::{EMAIL_RE, MIN_PASSWORD_LEN, PHONE_RE, TELEGRAM_RE, ValidationError};

    pub fn validate_required(value: &str, field: &'static str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new(field, "is required"));
        }
        Ok(())
    }

    pub fn validate_email(email: &str, field: &'static str) -> Result<(), ValidationError> {
        validate_required(email, field)?;
        if !EMAIL_RE.is_match(email) {
            return Err(ValidationError::new(field, "must be a valid email address"));
        }
        Ok(())
    }

    pub fn validate_password(password: &str, field: &'static str) -> Result<(), ValidationError> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::new(
                field,
                format!("must be at least {MIN_PASSWORD_LEN} characters"),
            ));
        }
        Ok(())
    }

    /// `+` followed by 10 to 15 digits
    pub fn validate_phone(phone: &str, field: &'static str) -> Result<(), ValidationError> {
        if !PHONE_RE.is_match(phone) {
            return Err(ValidationError::new(
                field,
                "must start with + and contain 10 to 15 digits",
            ));
        }
        Ok(())
    }

    /// `@` followed by 5 to 32 letters, digits or underscores
    pub fn validate_telegram(handle: &str, field: &'static str) -> Result<(), ValidationError> {
        if !TELEGRAM_RE.is_match(handle) {
            return Err(ValidationError::new(
                field,
                "must start with @ and contain 5 to 32 letters, digits or underscores",
            ));
        }
        Ok(())
    }
}
