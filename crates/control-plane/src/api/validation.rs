// Input validation for registration and login
//
// Length rules are counted in characters, not bytes. The upper bounds match
// the VARCHAR(255) columns of the users table.

use regex::Regex;
use std::sync::OnceLock;

use crate::auth::AuthError;

// =============================================================================
// Input Limits
// =============================================================================

/// Minimum username length (after trimming).
pub const MIN_USERNAME_CHARS: usize = 3;

/// Minimum password length.
pub const MIN_PASSWORD_CHARS: usize = 5;

/// Column width for username and email.
pub const MAX_FIELD_CHARS: usize = 255;

/// Upper bound on password input, hashing cost grows with length.
pub const MAX_PASSWORD_CHARS: usize = 1024;

// =============================================================================
// Validation Functions
// =============================================================================

/// Validation error carrying a client-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl From<ValidationError> for AuthError {
    fn from(err: ValidationError) -> Self {
        AuthError::Validation(err.0)
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

/// Validate a (trimmed) username
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    if len < MIN_USERNAME_CHARS {
        return Err(ValidationError(format!(
            "Username must be at least {} characters long",
            MIN_USERNAME_CHARS
        )));
    }
    if len > MAX_FIELD_CHARS {
        tracing::warn!("Username exceeds limit: {} chars (max: {})", len, MAX_FIELD_CHARS);
        return Err(ValidationError(format!(
            "Username must be at most {} characters long",
            MAX_FIELD_CHARS
        )));
    }
    Ok(())
}

/// Validate a password chosen at registration
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_CHARS {
        return Err(ValidationError(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_CHARS
        )));
    }
    if len > MAX_PASSWORD_CHARS {
        return Err(ValidationError(format!(
            "Password must be at most {} characters long",
            MAX_PASSWORD_CHARS
        )));
    }
    Ok(())
}

/// Validate an optional email address
pub fn validate_email(email: Option<&str>) -> Result<(), ValidationError> {
    if let Some(email) = email {
        if email.chars().count() > MAX_FIELD_CHARS || !email_regex().is_match(email) {
            return Err(ValidationError("Invalid email address".to_string()));
        }
    }
    Ok(())
}

/// Validate all fields of a registration
pub fn validate_registration(
    username: &str,
    password: &str,
    email: Option<&str>,
) -> Result<(), ValidationError> {
    validate_username(username)?;
    validate_password(password)?;
    validate_email(email)?;
    Ok(())
}

/// Login only requires both fields to be present
pub fn validate_login(username: &str, password: &str) -> Result<(), ValidationError> {
    if username.is_empty() || password.is_empty() {
        return Err(ValidationError(
            "Username and password are required".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_length() {
        assert!(validate_username("al").is_err());
        assert!(validate_username("ali").is_ok());
        assert!(validate_username(&"a".repeat(MAX_FIELD_CHARS)).is_ok());
        assert!(validate_username(&"a".repeat(MAX_FIELD_CHARS + 1)).is_err());
    }

    #[test]
    fn test_length_counts_characters() {
        // Three characters, six bytes
        assert!(validate_username("éèê").is_ok());
        assert!(validate_password("ñññ").is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("1234").is_err());
        assert!(validate_password("12345").is_ok());
        assert!(validate_password(&"x".repeat(MAX_PASSWORD_CHARS + 1)).is_err());
    }

    #[test]
    fn test_email_format() {
        assert!(validate_email(None).is_ok());
        assert!(validate_email(Some("alice@example.com")).is_ok());
        assert!(validate_email(Some("alice@example")).is_err());
        assert!(validate_email(Some("alice example@x.io")).is_err());
        assert!(validate_email(Some("@example.com")).is_err());
    }

    #[test]
    fn test_registration_reports_first_failure() {
        let err = validate_registration("al", "x", Some("bad")).unwrap_err();
        assert!(err.0.starts_with("Username"));

        let err = validate_registration("alice", "x", Some("bad")).unwrap_err();
        assert!(err.0.starts_with("Password"));

        assert!(validate_registration("alice", "pass1234", None).is_ok());
    }

    #[test]
    fn test_login_requires_both_fields() {
        assert!(validate_login("", "secret").is_err());
        assert!(validate_login("alice", "").is_err());
        assert!(validate_login("alice", "x").is_ok());
    }

    #[test]
    fn test_converts_to_auth_error() {
        let err: AuthError = ValidationError("nope".to_string()).into();
        assert!(matches!(err, AuthError::Validation(ref m) if m == "nope"));
    }
}
