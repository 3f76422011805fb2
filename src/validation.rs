//! Request payload validation
//!
//! Every request body implements [`Validate`]; handlers call
//! `payload.validate()?` before any database work. Failures collect into a
//! single 400 response with one message per field.

use std::str::FromStr;

use crate::error::{ApiError, FieldErrors};

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 5000;
pub const MAX_BODY_LEN: usize = 5000;
pub const MIN_PASSWORD_LEN: usize = 8;

pub trait Validate {
    fn validate(&self) -> Result<(), ApiError>;
}

/// Accumulates per-field errors
#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn check(&mut self, field: &str, ok: bool, message: &str) -> &mut Self {
        if !ok {
            self.fail(field, message);
        }
        self
    }

    /// Non-blank after trimming and at most `max` characters
    pub fn required_text(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.fail(field, "This field is required");
        } else if trimmed.chars().count() > max {
            self.fail(field, format!("Must be at most {} characters", max));
        }
        self
    }

    /// Like `required_text`, but only when a value is present
    pub fn optional_text(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if let Some(value) = value {
            self.required_text(field, value, max);
        }
        self
    }

    /// Length limit only; blank is allowed
    pub fn max_len(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if let Some(value) = value {
            if value.chars().count() > max {
                self.fail(field, format!("Must be at most {} characters", max));
            }
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !is_valid_email(value.trim()) {
            self.fail(field, "Invalid email format");
        }
        self
    }

    pub fn password(&mut self, field: &str, value: &str) -> &mut Self {
        if value.chars().count() < MIN_PASSWORD_LEN {
            self.fail(field, format!("Must be at least {} characters", MIN_PASSWORD_LEN));
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error(
                "Request validation failed",
                Some(std::mem::take(&mut self.errors)),
            ))
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

/// Parse an optional query-string enum filter into a field error on failure
pub fn parse_filter<T>(field: &str, value: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = String>,
{
    value
        .filter(|v| !v.is_empty())
        .map(|v| v.parse::<T>().map_err(|e| ApiError::invalid_field(field, e)))
        .transpose()
}

/// Trimmed copy of an optional text field; blank becomes `None`
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskStatus;

    #[test]
    fn email_format() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("a.b+tag@sub.example.org"));
        assert!(!is_valid_email("ada"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada@@example.com"));
        assert!(!is_valid_email("ada@example..com"));
        assert!(!is_valid_email("ada lovelace@example.com"));
    }

    #[test]
    fn collects_every_failing_field() {
        let err = Validator::new()
            .required_text("name", "   ", MAX_NAME_LEN)
            .email("email", "nope")
            .password("password", "short")
            .finish()
            .unwrap_err();

        match err {
            ApiError::ValidationError { field_errors: Some(errors), .. } => {
                assert_eq!(errors.len(), 3);
                assert_eq!(errors["name"], "This field is required");
                assert_eq!(errors["password"], "Must be at least 8 characters");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn length_limit_counts_characters() {
        let long = "é".repeat(MAX_NAME_LEN);
        assert!(Validator::new().required_text("name", &long, MAX_NAME_LEN).finish().is_ok());
        let longer = "é".repeat(MAX_NAME_LEN + 1);
        assert!(Validator::new().required_text("name", &longer, MAX_NAME_LEN).finish().is_err());
    }

    #[test]
    fn optional_fields_pass_when_absent() {
        assert!(Validator::new()
            .optional_text("description", None, 10)
            .max_len("description", None, 10)
            .finish()
            .is_ok());
    }

    #[test]
    fn filter_parsing() {
        assert_eq!(parse_filter::<TaskStatus>("status", Some("done")).unwrap(), Some(TaskStatus::Done));
        assert_eq!(parse_filter::<TaskStatus>("status", Some("")).unwrap(), None);
        assert_eq!(parse_filter::<TaskStatus>("status", None).unwrap(), None);
        assert_eq!(parse_filter::<TaskStatus>("status", Some("later")).unwrap_err().status_code(), 400);
    }

    #[test]
    fn normalizes_blank_to_none() {
        assert_eq!(normalize_optional(Some("  ")), None);
        assert_eq!(normalize_optional(Some(" x ")), Some("x".to_string()));
    }
}
