//! Input validation for registration and note payloads.
//!
//! Validation runs before any cryptographic work so oversized or
//! malformed input is rejected cheaply.

use crate::config::NoteLimits;
use crate::error::{Result, SealnoteError};

/// Minimum password length in characters.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Validate an email address for registration.
///
/// Intentionally loose: one `@` with a non-empty local part and a domain
/// containing a dot. Deliverability is the mail system's problem.
pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(SealnoteError::Validation(
            "Email cannot be empty".to_string(),
        ));
    }

    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') =>
        {
            Ok(())
        }
        _ => Err(SealnoteError::Validation(
            "Email address is not valid".to_string(),
        )),
    }
}

/// Validate a password meets minimum requirements.
pub fn validate_password(password: &str) -> Result<()> {
    if password.trim().is_empty() {
        return Err(SealnoteError::Validation(
            "Password cannot be empty".to_string(),
        ));
    }

    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(SealnoteError::Validation(format!(
            "Password must be at least {} characters (got {})",
            MIN_PASSWORD_LENGTH,
            password.len()
        )));
    }

    Ok(())
}

/// Validate a note header against the configured limits.
pub fn validate_header(header: &str, limits: &NoteLimits) -> Result<()> {
    if header.is_empty() {
        return Err(SealnoteError::Validation(
            "Note header cannot be empty".to_string(),
        ));
    }
    if header.len() > limits.max_header_bytes {
        return Err(SealnoteError::Validation(format!(
            "Note header too long (max {} bytes)",
            limits.max_header_bytes
        )));
    }
    Ok(())
}

/// Validate note content against the configured limits.
pub fn validate_content(content: &str, limits: &NoteLimits) -> Result<()> {
    if content.is_empty() {
        return Err(SealnoteError::Validation(
            "Note content cannot be empty".to_string(),
        ));
    }
    if content.len() > limits.max_content_bytes {
        return Err(SealnoteError::Validation(format!(
            "Note content too long (max {} bytes)",
            limits.max_content_bytes
        )));
    }
    Ok(())
}
