//! Email delivery with redundant providers and PDF attachments
//!
//! This module provides:
//! - Three provider backends (`SendGrid` HTTP API, Mailgun SMTP, Gmail SMTP)
//!   behind the [`EmailProvider`] trait
//! - Askama templates for the owner notifications
//! - The [`DeliveryOrchestrator`], which walks the enabled providers in
//!   priority order and stops at the first success
//!
//! # Examples
//!
//! ```rust,no_run
//! use chrono::Local;
//! use stratek::config::StratekConfig;
//! use stratek::contact::ContactForm;
//! use stratek::email::DeliveryOrchestrator;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = StratekConfig::load()?;
//! let orchestrator = DeliveryOrchestrator::from_settings(&config.email);
//!
//! let submission = ContactForm {
//!     nombre: Some("Ana".into()),
//!     email: Some("ana@x.com".into()),
//!     mensaje: Some("Necesito una web".into()),
//!     ..ContactForm::default()
//! }
//! .into_contact_submission()?;
//!
//! let result = orchestrator
//!     .send_contact_email(&submission, None, Local::now().naive_local())
//!     .await;
//! println!("delivered via {:?}", result.succeeded_with);
//! # Ok(())
//! # }
//! ```

mod backend;
mod error;
mod message;
mod orchestrator;
mod provider;
mod template;

pub use backend::{
    sendgrid::{SendGridBackend, SENDGRID},
    smtp::{SmtpBackend, GMAIL, MAILGUN},
};
pub use error::ProviderError;
pub use message::{Attachment, OutboundEmail, PDF_CONTENT_TYPE};
pub use orchestrator::{DeliveryOrchestrator, DeliveryResult, NO_PROVIDER_CONFIGURED};
#[cfg(test)]
pub use provider::MockEmailProvider;
pub use provider::{EmailProvider, SentReceipt};
pub use template::{contact_subject, quote_subject, ContactEmail, QuoteEmail};
