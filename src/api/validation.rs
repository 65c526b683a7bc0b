use serde::Serialize;
use validator::ValidationErrors;

use crate::api::errors::ApiError;

pub(crate) const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct FieldError {
    pub(crate) field: String,
    pub(crate) message: String,
}

impl FieldError {
    pub(crate) fn new(field: &str, message: impl Into<String>) -> Self {
        Self { field: field.to_string(), message: message.into() }
    }
}

/// Ordered accumulator for form errors. Nothing is raised until `finish`.
#[derive(Debug, Default)]
pub(crate) struct FormErrors {
    errors: Vec<FieldError>,
}

impl FormErrors {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub(crate) fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Appends the first derive-validator failure per field, walking `order` so output
    /// follows the form layout.
    pub(crate) fn absorb(&mut self, result: &Result<(), ValidationErrors>, order: &[&str]) {
        let Err(errors) = result else {
            return;
        };
        let field_errors = errors.field_errors();

        for field in order {
            let Some(error) = field_errors.get(*field).and_then(|list| list.first()) else {
                continue;
            };
            let message = error
                .message
                .as_deref()
                .map(str::to_string)
                .unwrap_or_else(|| format!("Invalid value ({}).", error.code));
            self.add(field, message);
        }
    }

    pub(crate) fn finish(self, submitted: serde_json::Value) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation { errors: self.errors, submitted })
        }
    }
}

/// Emails are compared case-insensitively; the stored form is trimmed lowercase.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn password_long_enough(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

pub(crate) fn password_too_short_message() -> String {
    format!("Password must be at least {MIN_PASSWORD_LEN} characters long.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "Name is required."))]
        name: String,
        #[validate(email(message = "Enter a valid email address."))]
        email: String,
    }

    #[test]
    fn absorb_follows_given_field_order() {
        let sample = Sample { name: String::new(), email: "nope".to_string() };
        let mut errors = FormErrors::new();
        errors.add("role", "Select a valid role.");
        errors.absorb(&sample.validate(), &["email", "name"]);

        let fields: Vec<_> = errors.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["role", "email", "name"]);
        assert!(errors.has("email"));
    }

    #[test]
    fn finish_without_errors_is_ok() {
        assert!(FormErrors::new().finish(serde_json::json!({})).is_ok());
    }

    #[test]
    fn password_length_counts_characters() {
        assert!(!password_long_enough("1234567"));
        assert!(password_long_enough("12345678"));
        assert!(password_long_enough("éééééééé"));
    }

    #[test]
    fn email_normalization_trims_and_lowercases() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }
}
