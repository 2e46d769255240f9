//! `POST /api/contact`

use axum::{extract::State, Json};
use chrono::Local;
use serde::Serialize;

use super::{log_render_failure, SubmissionDetails};
use crate::contact::{ContactForm, ContactSubmission, FormJson, ValidationError};
use crate::state::AppState;

/// Message returned for every accepted contact request
pub const CONTACT_SUCCESS_MESSAGE: &str =
    "Formulario enviado correctamente. Te contactaremos pronto.";

/// Body of a successful contact response
#[derive(Debug, Clone, Serialize)]
pub struct ContactResponse {
    /// Always `true`
    pub success: bool,
    /// Human readable confirmation
    pub message: &'static str,
    /// Outcome of the best-effort steps
    pub details: SubmissionDetails,
}

/// Render and deliver a validated contact request
///
/// Never fails: a render error drops the attachment and a delivery error is
/// reported in the returned details.
pub async fn process_contact(state: &AppState, submission: &ContactSubmission) -> SubmissionDetails {
    let now = Local::now().naive_local();

    let artifact = state.pdf().render_contact(submission, now).await;
    log_render_failure("contact", &artifact);

    let delivery = state
        .orchestrator()
        .send_contact_email(submission, artifact.as_ref().ok(), now)
        .await;

    SubmissionDetails::collect(&artifact, &delivery)
}

/// Handle a contact form submission
///
/// # Errors
///
/// Returns [`ValidationError`] (400) when a required field is missing or
/// the email is malformed. Nothing is rendered or sent in that case.
pub async fn submit_contact(
    State(state): State<AppState>,
    FormJson(form): FormJson<ContactForm>,
) -> Result<Json<ContactResponse>, ValidationError> {
    let submission = form.into_contact_submission().inspect_err(|e| {
        tracing::debug!(error = %e, "Contact form rejected");
    })?;

    tracing::info!(
        name = %submission.name,
        priority = submission.priority.label(),
        "Contact request received"
    );

    let details = process_contact(&state, &submission).await;

    Ok(Json(ContactResponse {
        success: true,
        message: CONTACT_SUCCESS_MESSAGE,
        details,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StratekConfig;
    use crate::email::{DeliveryOrchestrator, MockEmailProvider, SentReceipt};
    use crate::pdf::{MockPdfEngine, PdfRenderer, RenderError};
    use std::sync::Arc;

    fn form() -> ContactForm {
        ContactForm {
            nombre: Some("Ana".to_string()),
            email: Some("ana@x.com".to_string()),
            mensaje: Some("Necesito una web".to_string()),
            ..ContactForm::default()
        }
    }

    fn sendgrid() -> MockEmailProvider {
        let mut provider = MockEmailProvider::new();
        provider.expect_name().return_const("sendgrid");
        provider
            .expect_send()
            .withf(|email| email.attachment.is_none())
            .times(1)
            .returning(|_| {
                Ok(SentReceipt {
                    provider: "sendgrid",
                    message_id: None,
                })
            });
        provider
    }

    #[tokio::test]
    async fn test_render_failure_still_delivers() {
        let mut engine = MockPdfEngine::new();
        engine
            .expect_html_to_pdf()
            .returning(|_| Err(RenderError::engine("no chrome")));

        let state = AppState::new(
            StratekConfig::default(),
            DeliveryOrchestrator::new(vec![Arc::new(sendgrid())]),
            PdfRenderer::with_engine(Arc::new(engine)),
        );

        let Json(response) = submit_contact(State(state), FormJson(form())).await.unwrap();

        assert!(response.success);
        assert_eq!(response.message, CONTACT_SUCCESS_MESSAGE);
        assert!(!response.details.pdf_generated);
        assert!(response.details.email_sent);
        assert_eq!(response.details.email_service, Some("sendgrid"));
        assert_eq!(response.details.errors, vec!["Error generating PDF".to_string()]);
    }

    #[tokio::test]
    async fn test_invalid_email_touches_nothing() {
        let mut provider = MockEmailProvider::new();
        provider.expect_name().return_const("sendgrid");
        provider.expect_send().never();
        let mut engine = MockPdfEngine::new();
        engine.expect_html_to_pdf().never();

        let state = AppState::new(
            StratekConfig::default(),
            DeliveryOrchestrator::new(vec![Arc::new(provider)]),
            PdfRenderer::with_engine(Arc::new(engine)),
        );

        let mut bad = form();
        bad.email = Some("no-es-un-email".to_string());

        let err = submit_contact(State(state), FormJson(bad)).await.unwrap_err();
        assert!(matches!(err, ValidationError::InvalidEmail));
    }
}
