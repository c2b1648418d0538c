//! Input validation for clients, campaigns and assistants.

use std::fmt;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Phone number not in `+<digits>` form.
    InvalidPhone(String),
    /// Invalid email format.
    InvalidEmail(String),
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Empty value where one is required.
    Empty(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidPhone(msg) => write!(f, "Invalid phone: {}", msg),
            ValidationError::InvalidEmail(msg) => write!(f, "Invalid email: {}", msg),
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum allowed length for display names (clients, groups, campaigns, assistants).
pub const MAX_NAME_LENGTH: usize = 120;

/// Maximum allowed length for email addresses.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Digits allowed after the leading `+` (E.164 caps at 15).
pub const MIN_PHONE_DIGITS: usize = 8;
pub const MAX_PHONE_DIGITS: usize = 15;

/// Validate a required name field: non-empty after trimming and bounded.
pub fn validate_name(field: &str, value: &str) -> Result<(), ValidationError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }

    let len = value.chars().count();
    if len > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
            actual: len,
        });
    }

    Ok(())
}

/// Validate a phone number in international format, e.g. `+5511999999999`.
///
/// Spaces, dashes and parentheses are tolerated as separators.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Empty("phone".to_string()));
    }

    let Some(rest) = phone.strip_prefix('+') else {
        return Err(ValidationError::InvalidPhone(
            "must start with '+' and a country code".to_string(),
        ));
    };

    let mut digits = 0;
    for c in rest.chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '-' | '(' | ')' => {}
            other => {
                return Err(ValidationError::InvalidPhone(format!(
                    "unexpected character '{}'",
                    other
                )))
            }
        }
    }

    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits) {
        return Err(ValidationError::InvalidPhone(format!(
            "expected {} to {} digits, got {}",
            MIN_PHONE_DIGITS, MAX_PHONE_DIGITS, digits
        )));
    }

    Ok(())
}

/// Strip separators from a phone number that passed [`validate_phone`].
pub fn normalize_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    format!("+{}", digits)
}

/// Validate an email address (local@domain.tld, bounded length).
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Empty("email".to_string()));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LENGTH,
            actual: email.len(),
        });
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::InvalidEmail("missing @".to_string()));
    };

    if local.is_empty() || domain.contains('@') {
        return Err(ValidationError::InvalidEmail(
            "expected exactly one local part and domain".to_string(),
        ));
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(ValidationError::InvalidEmail(
            "domain must look like example.com".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone_valid() {
        assert!(validate_phone("+5511999999999").is_ok());
        assert!(validate_phone("+1 (555) 010-4477").is_ok());
        assert!(validate_phone(" +351912345678 ").is_ok());
    }

    #[test]
    fn test_validate_phone_invalid() {
        assert!(matches!(validate_phone(""), Err(ValidationError::Empty(_))));

        // Missing country prefix
        assert!(matches!(
            validate_phone("11999999999"),
            Err(ValidationError::InvalidPhone(_))
        ));

        // Letters
        assert!(matches!(
            validate_phone("+55abc999999"),
            Err(ValidationError::InvalidPhone(_))
        ));

        // Too short, too long
        assert!(matches!(
            validate_phone("+12345"),
            Err(ValidationError::InvalidPhone(_))
        ));
        assert!(matches!(
            validate_phone("+1234567890123456"),
            Err(ValidationError::InvalidPhone(_))
        ));
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("+1 (555) 010-4477"), "+15550104477");
        assert_eq!(normalize_phone("+5511999999999"), "+5511999999999");
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("first.last@mail.co.uk").is_ok());

        assert!(matches!(validate_email(" "), Err(ValidationError::Empty(_))));
        assert!(matches!(
            validate_email("ana.example.com"),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("a@b@c.com"),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("ana@localhost"),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("ana@example..com"),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Black Friday").is_ok());
        assert!(matches!(
            validate_name("name", "   "),
            Err(ValidationError::Empty(_))
        ));

        let long = "x".repeat(MAX_NAME_LENGTH + 1);
        assert_eq!(
            validate_name("name", &long),
            Err(ValidationError::TooLong {
                field: "name".to_string(),
                max: MAX_NAME_LENGTH,
                actual: MAX_NAME_LENGTH + 1,
            })
        );
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::InvalidPhone("must start with '+'".to_string());
        assert_eq!(err.to_string(), "Invalid phone: must start with '+'");

        let err = ValidationError::Empty("name".to_string());
        assert_eq!(err.to_string(), "name cannot be empty");
    }
}
