//! Client-side input validation — email shape, password policy, message body
//!
//! All checks run before any network call. Email validation is a simple
//! pattern check, not full RFC validation; the password minimum mirrors the
//! identity provider's observed policy.

use crate::error::{ClientError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Minimum password length accepted by the identity provider
pub const MIN_PASSWORD_LEN: usize = 6;

/// `local@domain.tld` shape: no whitespace or extra `@`, TLD of 2+ chars
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").expect("valid email regex"));

/// Check whether a string has a plausible email shape
pub fn is_email_valid(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Validate an email address, rejecting with `InvalidEmail`
pub fn validate_email(email: &str) -> Result<()> {
    if is_email_valid(email) {
        Ok(())
    } else {
        Err(ClientError::InvalidEmail(email.to_string()))
    }
}

/// Validate a password against the provider's minimum-length policy
pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        Err(ClientError::WeakPassword {
            min_len: MIN_PASSWORD_LEN,
        })
    } else {
        Ok(())
    }
}

/// Validate a message body, rejecting whitespace-only text
pub fn validate_message_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        Err(ClientError::EmptyMessage)
    } else {
        Ok(())
    }
}
