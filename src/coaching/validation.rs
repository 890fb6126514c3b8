//! Input checks applied before any step transition.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// `local@domain.tld`: word characters, dots, and dashes on both sides of a
/// single `@`, with at least one dot-separated suffix.
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.-]+@[\w.-]+\.\w+$").expect("email pattern compiles"));

/// Form field a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Email,
}

/// A user-facing validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: Field,
    pub message: String,
}

impl ValidationError {
    fn new(field: Field, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Validate the lead-capture form. Returns the trimmed name and email.
pub fn validate_lead(name: &str, email: &str) -> Result<(String, String), ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::new(
            Field::Name,
            "Please enter a valid name and email.",
        ));
    }
    let email = validate_email(email, "Please enter a valid name and email.")?;
    Ok((name.to_string(), email))
}

/// Validate the confirmation email on the summary step.
pub fn validate_confirmation_email(email: &str) -> Result<String, ValidationError> {
    validate_email(email, "Please enter a valid email.")
}

fn validate_email(email: &str, message: &str) -> Result<String, ValidationError> {
    let email = email.trim();
    if email.is_empty() || !is_valid_email(email) {
        return Err(ValidationError::new(Field::Email, message));
    }
    Ok(email.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_addresses() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last@sub.domain.org"));
        assert!(is_valid_email("alex@example.com"));
        assert!(is_valid_email("my-name_1@mail-host.io"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("plainaddress"));
        assert!(!is_valid_email("a@@b.com"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("@b.com"));
    }

    #[test]
    fn lead_requires_name() {
        let err = validate_lead("   ", "alex@example.com").unwrap_err();
        assert_eq!(err.field, Field::Name);
    }

    #[test]
    fn lead_requires_valid_email() {
        let err = validate_lead("Alex", "alex@example").unwrap_err();
        assert_eq!(err.field, Field::Email);
        let err = validate_lead("Alex", "").unwrap_err();
        assert_eq!(err.field, Field::Email);
    }

    #[test]
    fn lead_trims_inputs() {
        let (name, email) = validate_lead("  Alex ", " alex@example.com ").unwrap();
        assert_eq!(name, "Alex");
        assert_eq!(email, "alex@example.com");
    }

    #[test]
    fn confirmation_uses_same_pattern() {
        assert!(validate_confirmation_email("alex@example.com").is_ok());
        let err = validate_confirmation_email("plainaddress").unwrap_err();
        assert_eq!(err.field, Field::Email);
        assert_eq!(err.message, "Please enter a valid email.");
    }
}
