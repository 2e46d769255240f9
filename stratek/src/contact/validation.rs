//! Form validation errors and the email pattern

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use crate::error::ErrorEnvelope;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Reasons a form is rejected before any work is done
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Required fields absent or blank
    #[error("Faltan campos requeridos: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// The email does not look like an address
    #[error("Email inválido")]
    InvalidEmail,

    /// The body could not be parsed as the expected JSON object
    #[error("Datos del formulario inválidos")]
    MalformedBody(String),
}

impl ValidationError {
    /// Field names to report back to the client
    #[must_use]
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            Self::MissingFields(fields) => fields.clone(),
            Self::InvalidEmail => vec!["email"],
            Self::MalformedBody(_) => Vec::new(),
        }
    }
}

/// Check an address against `^[^\s@]+@[^\s@]+\.[^\s@]+$`
///
/// # Errors
///
/// Returns [`ValidationError::InvalidEmail`] when the pattern does not match.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_PATTERN.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        if let Self::MalformedBody(detail) = &self {
            tracing::debug!(detail = %detail, "Rejected unparseable form body");
        } else {
            tracing::debug!(error = %self, "Rejected invalid form");
        }

        ErrorEnvelope::new(self.to_string())
            .with_fields(self.fields())
            .into_response_with(StatusCode::BAD_REQUEST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_accepts_common_addresses() {
        assert!(validate_email("ana@x.com").is_ok());
        assert!(validate_email("first.last+tag@mail.example.es").is_ok());
    }

    #[test]
    fn test_rejects_malformed_addresses() {
        for bad in ["", "ana", "ana@x", "@x.com", "ana @x.com", "ana@@x.com", "ana@x .com"] {
            assert_eq!(validate_email(bad), Err(ValidationError::InvalidEmail), "{bad}");
        }
    }

    #[test]
    fn test_missing_fields_message() {
        let err = ValidationError::MissingFields(vec!["nombre", "email"]);
        assert_eq!(err.to_string(), "Faltan campos requeridos: nombre, email");
        assert_eq!(err.fields(), vec!["nombre", "email"]);
    }

    #[test]
    fn test_response_is_bad_request() {
        let response = ValidationError::InvalidEmail.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    proptest! {
        #[test]
        fn prop_whitespace_never_validates(local in "[a-z]{1,8}", domain in "[a-z]{1,8}") {
            let with_space = format!("{local} @{domain}.com");
            prop_assert!(validate_email(&with_space).is_err());

            let clean = format!("{local}@{domain}.com");
            prop_assert!(validate_email(&clean).is_ok());
        }
    }
}
