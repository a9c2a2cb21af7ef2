/// Input validators - protect the auth endpoints from junk input
/// Features:
/// 1. DoS protection: input length limits
/// 2. Phishing protection: email format validation
/// 3. Control character rejection in display names and token names

use regex::Regex;
use lazy_static::lazy_static;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_EMAIL_LENGTH: usize = 5;
const MAX_NAME_LENGTH: usize = 256;
const MAX_TOKEN_NAME_LENGTH: usize = 64;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();
}

/// Validates an email address and returns the trimmed value.
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }
    if trimmed.len() < MIN_EMAIL_LENGTH {
        return Err(ValidationError::TooShort("email".to_string(), MIN_EMAIL_LENGTH));
    }
    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH));
    }
    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }
    // Overlong local part is a phishing indicator
    if let Some(at_pos) = trimmed.find('@') {
        if trimmed[..at_pos].len() > 64 {
            return Err(ValidationError::SuspiciousContent("email".to_string()));
        }
    }

    Ok(trimmed.to_string())
}

/// Validates a display name and returns the trimmed value.
pub fn is_valid_full_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("full_name".to_string()));
    }
    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong("full_name".to_string(), MAX_NAME_LENGTH));
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::SuspiciousContent("full_name".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validates an API token name. Empty input falls back to "default",
/// matching the token-creation endpoint's behavior for a missing name.
pub fn is_valid_token_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Ok("default".to_string());
    }
    if trimmed.len() > MAX_TOKEN_NAME_LENGTH {
        return Err(ValidationError::TooLong(
            "name".to_string(),
            MAX_TOKEN_NAME_LENGTH,
        ));
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::SuspiciousContent("name".to_string()));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_emails() {
        for email in ["user@example.com", "a.b+tag@sub.domain.org", "x_1@host.io"] {
            assert!(is_valid_email(email).is_ok(), "should accept {}", email);
        }
    }

    #[test]
    fn rejects_malformed_emails() {
        for email in ["notanemail", "user@", "@example.com", "user@@example.com", ""] {
            assert!(is_valid_email(email).is_err(), "should reject {}", email);
        }
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(
            is_valid_email("  user@example.com  ").unwrap(),
            "user@example.com"
        );
    }

    #[test]
    fn rejects_overlong_local_part() {
        let email = format!("{}@example.com", "a".repeat(65));
        assert!(is_valid_email(&email).is_err());
    }

    #[test]
    fn full_name_rejects_control_characters() {
        assert!(is_valid_full_name("John\x00Doe").is_err());
        assert!(is_valid_full_name("John Doe").is_ok());
    }

    #[test]
    fn empty_token_name_falls_back_to_default() {
        assert_eq!(is_valid_token_name("").unwrap(), "default");
        assert_eq!(is_valid_token_name("ci-deploy").unwrap(), "ci-deploy");
    }

    #[test]
    fn overlong_token_name_is_rejected() {
        assert!(is_valid_token_name(&"n".repeat(65)).is_err());
    }
}
