//! Provider-neutral outbound email
//!
//! The orchestrator builds one [`OutboundEmail`] per submission; each
//! provider adds its own sender and recipient before handing it off.

use super::ProviderError;

/// MIME type of every attachment this service sends
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A file attached to an outbound email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Filename shown to the recipient
    pub filename: String,
    /// MIME type
    pub content_type: String,
    /// Raw file content
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// A PDF attachment
    #[must_use]
    pub fn pdf(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: PDF_CONTENT_TYPE.to_string(),
            bytes,
        }
    }
}

/// An email addressed to the site owner
///
/// ```rust
/// use stratek::email::{Attachment, OutboundEmail};
///
/// let email = OutboundEmail::new()
///     .subject("🟡 Nueva solicitud de contacto - Ana | Stratek")
///     .html("<p>Hola</p>")
///     .reply_to("ana@x.com")
///     .attachment(Attachment::pdf("Solicitud.pdf", vec![]));
///
/// assert!(email.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutboundEmail {
    /// Email subject
    pub subject: Option<String>,

    /// HTML body
    pub html: Option<String>,

    /// Reply-To address (the submitter)
    pub reply_to: Option<String>,

    /// CC recipients
    pub cc: Vec<String>,

    /// Optional PDF attachment
    pub attachment: Option<Attachment>,
}

impl OutboundEmail {
    /// Create a new empty email
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the subject
    #[must_use]
    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = Some(subject.to_string());
        self
    }

    /// Set the HTML body
    #[must_use]
    pub fn html(mut self, html: &str) -> Self {
        self.html = Some(html.to_string());
        self
    }

    /// Set the Reply-To address
    #[must_use]
    pub fn reply_to(mut self, address: &str) -> Self {
        self.reply_to = Some(address.to_string());
        self
    }

    /// Add a CC recipient
    #[must_use]
    pub fn cc(mut self, address: &str) -> Self {
        self.cc.push(address.to_string());
        self
    }

    /// Attach a file
    #[must_use]
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Attach a file if one is available
    #[must_use]
    pub fn maybe_attachment(mut self, attachment: Option<Attachment>) -> Self {
        self.attachment = attachment;
        self
    }

    /// Validate the email
    ///
    /// # Errors
    ///
    /// Returns an error if the subject or the HTML body is missing or blank
    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.subject.as_deref().is_none_or(|s| s.trim().is_empty()) {
            return Err(ProviderError::NoSubject);
        }

        if self.html.as_deref().is_none_or(|h| h.trim().is_empty()) {
            return Err(ProviderError::NoContent);
        }

        Ok(())
    }
}
