use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ApiError;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Normalizes and checks an email in one go.
pub fn validate_email(raw: &str) -> Result<String, ApiError> {
    let email = normalize_email(raw);
    if !is_valid_email(&email) {
        return Err(ApiError::Validation("Invalid email".into()));
    }
    Ok(email)
}

pub fn validate_password(password: &str, min_len: usize) -> Result<(), ApiError> {
    if password.chars().count() < min_len {
        return Err(ApiError::Validation(format!(
            "Password must be at least {min_len} characters"
        )));
    }
    Ok(())
}
