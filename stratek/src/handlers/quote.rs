//! `POST /api/quote`

use axum::{extract::State, Json};
use chrono::Local;
use serde::Serialize;

use super::{log_render_failure, SubmissionDetails};
use crate::contact::{ContactForm, FormJson, QuoteSubmission, ValidationError};
use crate::quote::{calculate_quote, Quote};
use crate::state::AppState;

/// Message returned for every generated quote
pub const QUOTE_SUCCESS_MESSAGE: &str = "Presupuesto generado correctamente";

/// Body of a successful quote response
#[derive(Debug, Clone, Serialize)]
pub struct QuoteResponse {
    /// Always `true`
    pub success: bool,
    /// Human readable confirmation
    pub message: &'static str,
    /// The computed quote
    pub quote: Quote,
    /// Outcome of the best-effort steps
    pub details: SubmissionDetails,
}

/// Price, render and deliver a validated quote request
pub async fn process_quote(state: &AppState, submission: &QuoteSubmission) -> (Quote, SubmissionDetails) {
    let now = Local::now().naive_local();
    let contact = &submission.contact;

    let quote = calculate_quote(&submission.service, contact.budget.as_deref(), now.date());
    tracing::debug!(service = %quote.service, total = quote.total, "Quote calculated");

    let artifact = state.pdf().render_quote(contact, &quote, now).await;
    log_render_failure("quote", &artifact);

    let delivery = state
        .orchestrator()
        .send_quote_email(contact, &quote, artifact.as_ref().ok())
        .await;

    let details = SubmissionDetails::collect(&artifact, &delivery);
    (quote, details)
}

/// Handle a quote request
///
/// # Errors
///
/// Returns [`ValidationError`] (400) when `nombre`, `email` or `servicio`
/// is missing, or the email is malformed.
pub async fn submit_quote(
    State(state): State<AppState>,
    FormJson(form): FormJson<ContactForm>,
) -> Result<Json<QuoteResponse>, ValidationError> {
    let submission = form.into_quote_submission().inspect_err(|e| {
        tracing::debug!(error = %e, "Quote request rejected");
    })?;

    tracing::info!(
        name = %submission.contact.name,
        service = %submission.service,
        "Quote request received"
    );

    let (quote, details) = process_quote(&state, &submission).await;

    Ok(Json(QuoteResponse {
        success: true,
        message: QUOTE_SUCCESS_MESSAGE,
        quote,
        details,
    }))
}
