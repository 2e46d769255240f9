//! SMTP backend for sending emails
//!
//! Uses the `lettre` crate to relay through Mailgun or Gmail. Both providers
//! share this implementation and differ only in name and credentials.

use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use uuid::Uuid;

use crate::config::{SmtpCredentials, TlsMode};
use crate::email::{EmailProvider, OutboundEmail, ProviderError, SentReceipt};

/// Provider name of the Mailgun relay
pub const MAILGUN: &str = "mailgun";

/// Provider name of the Gmail relay
pub const GMAIL: &str = "gmail";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// SMTP email backend
///
/// A transport is built for every send; the service sends at most one
/// message per request so there is nothing to pool.
pub struct SmtpBackend {
    name: &'static str,
    credentials: SmtpCredentials,
    timeout: Duration,
}

impl std::fmt::Debug for SmtpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpBackend")
            .field("name", &self.name)
            .field("host", &self.credentials.host)
            .field("port", &self.credentials.port)
            .field("tls", &self.credentials.tls)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl SmtpBackend {
    /// Create a new SMTP backend with the given name and credentials
    #[must_use]
    pub const fn new(name: &'static str, credentials: SmtpCredentials) -> Self {
        Self {
            name,
            credentials,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Give up on each SMTP command after `timeout`
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Mailgun SMTP relay
    #[must_use]
    pub const fn mailgun(credentials: SmtpCredentials) -> Self {
        Self::new(MAILGUN, credentials)
    }

    /// Gmail SMTP
    #[must_use]
    pub const fn gmail(credentials: SmtpCredentials) -> Self {
        Self::new(GMAIL, credentials)
    }

    fn parse_mailbox(address: &str) -> Result<Mailbox, ProviderError> {
        address
            .parse()
            .map_err(|_| ProviderError::InvalidAddress(address.to_string()))
    }

    /// Build lettre Message from an outbound email
    ///
    /// Returns the message together with the generated `Message-ID`.
    fn build_message(&self, email: &OutboundEmail) -> Result<(Message, String), ProviderError> {
        // Validate email first
        email.validate()?;

        let from = Self::parse_mailbox(&self.credentials.from)?;
        let to = Self::parse_mailbox(&self.credentials.to)?;
        let message_id = format!("<{}@{}>", Uuid::new_v4(), from.email.domain());

        let mut builder = Message::builder()
            .from(from)
            .to(to)
            .message_id(Some(message_id.clone()));

        for cc_addr in &email.cc {
            builder = builder.cc(Self::parse_mailbox(cc_addr)?);
        }

        if let Some(reply_to_addr) = &email.reply_to {
            builder = builder.reply_to(Self::parse_mailbox(reply_to_addr)?);
        }

        let subject = email.subject.as_ref().ok_or(ProviderError::NoSubject)?;
        builder = builder.subject(subject);

        let html = email.html.clone().ok_or(ProviderError::NoContent)?;

        let built = if let Some(attachment) = &email.attachment {
            let content_type = ContentType::parse(&attachment.content_type)
                .map_err(|e| ProviderError::Build(e.to_string()))?;
            builder.multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::html(html))
                    .singlepart(
                        Attachment::new(attachment.filename.clone())
                            .body(attachment.bytes.clone(), content_type),
                    ),
            )
        } else {
            builder.header(ContentType::TEXT_HTML).body(html)
        };
        let message = built.map_err(|e| ProviderError::Build(e.to_string()))?;

        Ok((message, message_id))
    }

    /// Create SMTP transport from credentials
    fn create_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, ProviderError> {
        let credentials = Credentials::new(
            self.credentials.username.clone(),
            self.credentials.password.clone(),
        );
        let host = &self.credentials.host;

        let transport = match self.credentials.tls {
            TlsMode::Starttls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| ProviderError::config(e.to_string()))?,
            TlsMode::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .map_err(|e| ProviderError::config(e.to_string()))?,
            TlsMode::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
        };

        Ok(transport
            .port(self.credentials.port)
            .credentials(credentials)
            .timeout(Some(self.timeout))
            .build())
    }
}

#[async_trait]
impl EmailProvider for SmtpBackend {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn send(&self, email: &OutboundEmail) -> Result<SentReceipt, ProviderError> {
        let (message, message_id) = self.build_message(email)?;
        let transport = self.create_transport()?;

        let response = transport
            .send(message)
            .await
            .map_err(|e| ProviderError::transport(e.to_string()))?;

        tracing::debug!(
            provider = self.name,
            code = %response.code(),
            message_id = %message_id,
            "SMTP relay accepted message"
        );

        Ok(SentReceipt {
            provider: self.name,
            message_id: Some(message_id),
        })
    }
}
