//! HTTP handlers for the form endpoints
//!
//! Both endpoints run the same linear pipeline: validate, render the PDF
//! (best-effort), deliver the email (best-effort), respond. Once validation
//! passes the answer is always 200; [`SubmissionDetails`] says which of the
//! best-effort steps actually worked.

pub mod contact;
pub mod quote;

pub use contact::{process_contact, submit_contact, ContactResponse, CONTACT_SUCCESS_MESSAGE};
pub use quote::{process_quote, submit_quote, QuoteResponse, QUOTE_SUCCESS_MESSAGE};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::email::DeliveryResult;
use crate::pdf::{RenderError, RenderedArtifact};

/// Error string reported when the PDF could not be produced
pub const PDF_ERROR: &str = "Error generating PDF";

/// What happened to the best-effort steps of one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDetails {
    /// A PDF was rendered
    pub pdf_generated: bool,
    /// Some provider accepted the email
    pub email_sent: bool,
    /// Provider that delivered the email
    pub email_service: Option<&'static str>,
    /// Time the submission finished processing
    pub timestamp: DateTime<Utc>,
    /// Reasons for failed steps
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl SubmissionDetails {
    fn collect(
        artifact: &Result<RenderedArtifact, RenderError>,
        delivery: &DeliveryResult,
    ) -> Self {
        let mut errors = Vec::new();
        if artifact.is_err() {
            errors.push(PDF_ERROR.to_string());
        }
        if let (false, Some(error)) = (delivery.is_sent(), &delivery.error) {
            errors.push(error.clone());
        }

        Self {
            pdf_generated: artifact.is_ok(),
            email_sent: delivery.is_sent(),
            email_service: delivery.succeeded_with,
            timestamp: Utc::now(),
            errors,
        }
    }
}

/// Log a render failure and keep going without an attachment
fn log_render_failure(kind: &str, result: &Result<RenderedArtifact, RenderError>) {
    if let Err(e) = result {
        tracing::warn!(document = kind, error = %e, "PDF unavailable, continuing without attachment");
    }
}
