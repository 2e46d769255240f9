//! `SendGrid` backend for sending emails
//!
//! Talks to the `SendGrid` v3 HTTP API (`POST /mail/send`) with `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;

use crate::config::SendGridCredentials;
use crate::email::{EmailProvider, OutboundEmail, ProviderError, SentReceipt};

/// Provider name reported in delivery results
pub const SENDGRID: &str = "sendgrid";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

impl<'a> Address<'a> {
    const fn bare(email: &'a str) -> Self {
        Self { email, name: None }
    }
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cc: Vec<Address<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct AttachmentPayload<'a> {
    content: String,
    filename: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    disposition: &'static str,
}

#[derive(Debug, Serialize)]
struct MailSend<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<Address<'a>>,
    subject: &'a str,
    content: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<AttachmentPayload<'a>>,
}

/// `SendGrid` email backend
///
/// # Examples
///
/// ```rust,no_run
/// use stratek::config::StratekConfig;
/// use stratek::email::{EmailProvider, OutboundEmail, SendGridBackend};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = StratekConfig::load()?;
/// let Some(credentials) = config.email.sendgrid_credentials() else {
///     return Ok(());
/// };
///
/// let backend = SendGridBackend::new(credentials);
/// backend
///     .send(&OutboundEmail::new().subject("Hola").html("<p>Hola</p>"))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct SendGridBackend {
    credentials: SendGridCredentials,
    client: reqwest::Client,
    timeout: Duration,
}

impl std::fmt::Debug for SendGridBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendGridBackend")
            .field("api_base", &self.credentials.api_base)
            .field("from", &self.credentials.from)
            .field("to", &self.credentials.to)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl SendGridBackend {
    /// Create a new `SendGrid` backend with the given credentials
    #[must_use]
    pub fn new(credentials: SendGridCredentials) -> Self {
        Self {
            credentials,
            client: reqwest::Client::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Give up on an API call after `timeout`
    ///
    /// Covers connecting, sending and reading the response. A call that runs
    /// out of time fails with [`ProviderError::Transport`].
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/mail/send", self.credentials.api_base.trim_end_matches('/'))
    }

    /// Build the `/mail/send` JSON payload
    fn build_payload<'a>(&'a self, email: &'a OutboundEmail) -> Result<MailSend<'a>, ProviderError> {
        email.validate()?;

        let subject = email.subject.as_deref().ok_or(ProviderError::NoSubject)?;
        let html = email.html.as_deref().ok_or(ProviderError::NoContent)?;

        let attachments = email
            .attachment
            .iter()
            .map(|attachment| AttachmentPayload {
                content: STANDARD.encode(&attachment.bytes),
                filename: &attachment.filename,
                kind: &attachment.content_type,
                disposition: "attachment",
            })
            .collect();

        Ok(MailSend {
            personalizations: vec![Personalization {
                to: vec![Address::bare(&self.credentials.to)],
                cc: email.cc.iter().map(|cc| Address::bare(cc)).collect(),
            }],
            from: Address {
                email: &self.credentials.from,
                name: Some(&self.credentials.from_name),
            },
            reply_to: email.reply_to.as_deref().map(Address::bare),
            subject,
            content: vec![Content {
                kind: "text/html",
                value: html,
            }],
            attachments,
        })
    }
}

#[async_trait]
impl EmailProvider for SendGridBackend {
    fn name(&self) -> &'static str {
        SENDGRID
    }

    async fn send(&self, email: &OutboundEmail) -> Result<SentReceipt, ProviderError> {
        let payload = self.build_payload(email)?;

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.credentials.api_key)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProviderError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let message_id = response
            .headers()
            .get("x-message-id")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);

        tracing::debug!(status = status.as_u16(), message_id = ?message_id, "SendGrid accepted message");

        Ok(SentReceipt {
            provider: SENDGRID,
            message_id,
        })
    }
}
