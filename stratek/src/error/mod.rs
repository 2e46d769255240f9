//! Error types and error handling
//!
//! Each concern owns its error enum (`ValidationError`, `RenderError`,
//! `ProviderError`, `RateLimitError`). [`StratekError`] covers the service
//! itself: configuration loading and binding the listener.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Message returned to clients for any unexpected failure
pub const INTERNAL_ERROR_MESSAGE: &str = "Error interno del servidor";

/// Service error type
#[derive(Debug, Error)]
pub enum StratekError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error (binding the listener, reading files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StratekError {
    /// Create a configuration error from a string message
    #[must_use]
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }
}

/// JSON body shared by every failure response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    /// Always `false`
    pub success: bool,

    /// Human readable reason
    pub message: String,

    /// Offending form fields, for validation failures
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<&'static str>,
}

impl ErrorEnvelope {
    /// Envelope with a message and no field list
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Attach the names of the fields that failed validation
    #[must_use]
    pub fn with_fields(mut self, fields: Vec<&'static str>) -> Self {
        self.fields = fields;
        self
    }

    /// Pair the envelope with a status code
    #[must_use]
    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

impl IntoResponse for StratekError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed with internal error");
        ErrorEnvelope::new(INTERNAL_ERROR_MESSAGE)
            .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
    }
}
