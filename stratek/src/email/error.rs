//! Email provider error types

use thiserror::Error;

/// Errors a single provider can report for one delivery attempt
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Email has no subject
    #[error("email must have a subject")]
    NoSubject,

    /// Email has no body content
    #[error("email must have HTML content")]
    NoContent,

    /// Invalid email address format
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// The message could not be assembled
    #[error("failed to build message: {0}")]
    Build(String),

    /// Network or protocol failure talking to the provider
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider answered with a non-success status
    #[error("provider rejected the message (status {status}): {body}")]
    Rejected {
        /// HTTP or SMTP status code
        status: u16,
        /// Response body or server message
        body: String,
    },

    /// Provider configuration error
    #[error("email configuration error: {0}")]
    Config(String),
}

impl ProviderError {
    /// Create a transport error from a string message
    #[must_use]
    pub fn transport<T: Into<String>>(msg: T) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a configuration error from a string message
    #[must_use]
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }
}
