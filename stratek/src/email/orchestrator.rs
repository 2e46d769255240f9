//! First-success delivery across the configured providers

use std::sync::Arc;

use askama::Template;
use chrono::NaiveDateTime;
use serde::Serialize;

use super::backend::{sendgrid::SendGridBackend, smtp::SmtpBackend};
use super::template::{contact_subject, quote_subject, ContactEmail, QuoteEmail};
use super::{Attachment, EmailProvider, OutboundEmail};
use crate::config::EmailSettings;
use crate::contact::{ContactSubmission, SubmissionView};
use crate::locale;
use crate::pdf::RenderedArtifact;
use crate::quote::Quote;

/// Failure reason when no provider has credentials
pub const NO_PROVIDER_CONFIGURED: &str = "No email service configured";

/// Outcome of one delivery
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResult {
    /// Providers tried, in order
    pub attempted: Vec<&'static str>,
    /// Provider that accepted the message
    pub succeeded_with: Option<&'static str>,
    /// Identifier reported by that provider
    pub message_id: Option<String>,
    /// Last failure reason
    pub error: Option<String>,
}

impl DeliveryResult {
    /// Whether some provider accepted the message
    #[must_use]
    pub const fn is_sent(&self) -> bool {
        self.succeeded_with.is_some()
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Tries providers in priority order until one accepts the message
///
/// At most one email is delivered per call. Provider errors are logged and
/// swallowed; only exhaustion is reported, through [`DeliveryResult`].
#[derive(Clone, Default)]
pub struct DeliveryOrchestrator {
    providers: Vec<Arc<dyn EmailProvider>>,
}

impl std::fmt::Debug for DeliveryOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryOrchestrator")
            .field("providers", &self.provider_names())
            .finish()
    }
}

impl DeliveryOrchestrator {
    /// Orchestrator over an explicit, already ordered provider list
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn EmailProvider>>) -> Self {
        Self { providers }
    }

    /// Build the provider chain from configuration
    ///
    /// Priority is `SendGrid`, then Mailgun, then Gmail. A provider whose
    /// credentials are incomplete is skipped and never constructed.
    #[must_use]
    pub fn from_settings(settings: &EmailSettings) -> Self {
        let timeout = settings.provider_timeout();
        let mut providers: Vec<Arc<dyn EmailProvider>> = Vec::new();

        if let Some(credentials) = settings.sendgrid_credentials() {
            providers.push(Arc::new(SendGridBackend::new(credentials).with_timeout(timeout)));
        } else {
            tracing::info!(provider = "sendgrid", "Email provider not configured");
        }

        if let Some(credentials) = settings.mailgun_credentials() {
            providers.push(Arc::new(SmtpBackend::mailgun(credentials).with_timeout(timeout)));
        } else {
            tracing::info!(provider = "mailgun", "Email provider not configured");
        }

        if let Some(credentials) = settings.gmail_credentials() {
            providers.push(Arc::new(SmtpBackend::gmail(credentials).with_timeout(timeout)));
        } else {
            tracing::info!(provider = "gmail", "Email provider not configured");
        }

        let orchestrator = Self::new(providers);
        if orchestrator.has_providers() {
            tracing::info!(providers = ?orchestrator.provider_names(), "Email delivery chain ready");
        } else {
            tracing::warn!("No email provider configured; submissions will not be delivered");
        }
        orchestrator
    }

    /// Enabled provider names in priority order
    #[must_use]
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Whether at least one provider is enabled
    #[must_use]
    pub fn has_providers(&self) -> bool {
        !self.providers.is_empty()
    }

    /// Deliver `email` through the first provider that accepts it
    pub async fn deliver(&self, email: &OutboundEmail) -> DeliveryResult {
        if self.providers.is_empty() {
            return DeliveryResult::failed(NO_PROVIDER_CONFIGURED);
        }

        let mut result = DeliveryResult::default();
        for provider in &self.providers {
            let name = provider.name();
            result.attempted.push(name);

            match provider.send(email).await {
                Ok(receipt) => {
                    tracing::info!(
                        provider = name,
                        message_id = ?receipt.message_id,
                        "Email delivered"
                    );
                    result.succeeded_with = Some(receipt.provider);
                    result.message_id = receipt.message_id;
                    result.error = None;
                    return result;
                }
                Err(e) => {
                    tracing::warn!(provider = name, error = %e, "Email provider failed, trying next");
                    result.error = Some(format!("{name}: {e}"));
                }
            }
        }

        tracing::error!(
            attempted = ?result.attempted,
            error = ?result.error,
            "All email providers failed"
        );
        result
    }

    /// Notify the site owner about a contact request
    ///
    /// The PDF summary is attached when available; the submitter becomes the
    /// Reply-To address.
    pub async fn send_contact_email(
        &self,
        submission: &ContactSubmission,
        artifact: Option<&RenderedArtifact>,
        now: NaiveDateTime,
    ) -> DeliveryResult {
        if !self.has_providers() {
            return DeliveryResult::failed(NO_PROVIDER_CONFIGURED);
        }

        let body = ContactEmail {
            view: SubmissionView::from(submission),
            generated_at: locale::long_date_time(now),
            has_attachment: artifact.is_some(),
        }
        .render();

        let html = match body {
            Ok(html) => html,
            Err(e) => {
                tracing::error!(error = %e, "Failed to render contact email");
                return DeliveryResult::failed(format!("failed to render email: {e}"));
            }
        };

        let email = OutboundEmail::new()
            .subject(&contact_subject(submission))
            .html(&html)
            .reply_to(&submission.email)
            .maybe_attachment(artifact.map(|a| Attachment::pdf(a.filename.clone(), a.bytes.clone())));

        self.deliver(&email).await
    }

    /// Send a generated quote to the site owner with the client in CC
    pub async fn send_quote_email(
        &self,
        submission: &ContactSubmission,
        quote: &Quote,
        artifact: Option<&RenderedArtifact>,
    ) -> DeliveryResult {
        if !self.has_providers() {
            return DeliveryResult::failed(NO_PROVIDER_CONFIGURED);
        }

        let body = QuoteEmail {
            name: submission.display_name(),
            quote,
            has_attachment: artifact.is_some(),
        }
        .render();

        let html = match body {
            Ok(html) => html,
            Err(e) => {
                tracing::error!(error = %e, "Failed to render quote email");
                return DeliveryResult::failed(format!("failed to render email: {e}"));
            }
        };

        let email = OutboundEmail::new()
            .subject(&quote_subject(submission, quote))
            .html(&html)
            .reply_to(&submission.email)
            .cc(&submission.email)
            .maybe_attachment(artifact.map(|a| Attachment::pdf(a.filename.clone(), a.bytes.clone())));

        self.deliver(&email).await
    }
}
