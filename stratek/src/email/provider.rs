//! Email provider trait abstraction
//!
//! This module defines the `EmailProvider` trait that every delivery backend
//! implements.

use async_trait::async_trait;

use super::{OutboundEmail, ProviderError};

/// Proof of a successful hand-off to a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentReceipt {
    /// Provider that accepted the message
    pub provider: &'static str,
    /// Identifier reported by the provider, when it gives one
    pub message_id: Option<String>,
}

/// Trait for delivering notification emails
///
/// Implemented by the `SendGrid` and SMTP backends. Each implementation owns
/// its sender and recipient addresses, so callers only supply content.
///
/// # Examples
///
/// ```rust,no_run
/// use stratek::email::{EmailProvider, OutboundEmail};
///
/// # async fn example(provider: &dyn EmailProvider) -> Result<(), Box<dyn std::error::Error>> {
/// let email = OutboundEmail::new()
///     .subject("Hola")
///     .html("<p>Hola</p>");
///
/// let receipt = provider.send(&email).await?;
/// println!("sent via {}", receipt.provider);
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Stable provider name (`sendgrid`, `mailgun`, `gmail`)
    fn name(&self) -> &'static str;

    /// Send an email
    ///
    /// Adapters never retry; a failure is reported once and the caller
    /// decides what to do next.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if the email is invalid or the provider does
    /// not accept it
    async fn send(&self, email: &OutboundEmail) -> Result<SentReceipt, ProviderError>;
}
