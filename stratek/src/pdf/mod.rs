//! PDF summaries of contact and quote requests
//!
//! Rendering is best-effort: callers treat any [`RenderError`] as "no
//! attachment" and carry on. The engine sits behind [`PdfEngine`] so the
//! service can run (and be tested) without a browser.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::{sync::Arc, time::Duration};
//! use chrono::Local;
//! use stratek::contact::ContactForm;
//! use stratek::pdf::{ChromeEngine, PdfRenderer};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let renderer = PdfRenderer::with_engine(Arc::new(ChromeEngine::new(None, Duration::from_secs(30))));
//!
//! let submission = ContactForm {
//!     nombre: Some("Ana".into()),
//!     email: Some("ana@x.com".into()),
//!     mensaje: Some("Necesito una web".into()),
//!     ..ContactForm::default()
//! }
//! .into_contact_submission()?;
//!
//! let artifact = renderer.render_contact(&submission, Local::now().naive_local()).await?;
//! println!("{} ({} bytes)", artifact.filename, artifact.bytes.len());
//! # Ok(())
//! # }
//! ```

mod document;
mod engine;

pub use document::{ContactDocument, QuoteDocument, DEFAULT_DELIVERY_TIME};
#[cfg(test)]
pub use engine::MockPdfEngine;
pub use engine::{ChromeEngine, PdfEngine};

use std::sync::Arc;
use std::time::Duration;

use askama::Template;
use chrono::NaiveDateTime;
use thiserror::Error;

use crate::config::PdfSettings;
use crate::contact::{ContactSubmission, SubmissionView};
use crate::locale;
use crate::quote::Quote;

/// Filename prefix of contact summaries
pub const CONTACT_FILENAME_PREFIX: &str = "Solicitud_Contacto";

/// Filename prefix of quotes
pub const QUOTE_FILENAME_PREFIX: &str = "Presupuesto";

/// Errors that can occur while producing a PDF
#[derive(Debug, Error)]
pub enum RenderError {
    /// PDF generation is switched off in configuration
    #[error("PDF rendering is disabled")]
    Disabled,

    /// The HTML template failed to render
    #[error("failed to render PDF template: {0}")]
    Template(#[from] askama::Error),

    /// The conversion engine reported a failure
    #[error("PDF engine error: {0}")]
    Engine(String),

    /// The engine did not finish in time
    #[error("PDF rendering timed out after {0:?}")]
    Timeout(Duration),

    /// The blocking render task panicked or was cancelled
    #[error("PDF render task failed: {0}")]
    Join(String),
}

impl RenderError {
    /// Create an engine error from a string message
    #[must_use]
    pub fn engine<T: Into<String>>(msg: T) -> Self {
        Self::Engine(msg.into())
    }
}

/// A rendered PDF ready to be attached to an email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    /// Attachment filename
    pub filename: String,
    /// PDF bytes
    pub bytes: Vec<u8>,
}

/// Turns submissions into PDF documents
#[derive(Clone)]
pub struct PdfRenderer {
    engine: Option<Arc<dyn PdfEngine>>,
}

impl std::fmt::Debug for PdfRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfRenderer")
            .field("enabled", &self.engine.is_some())
            .finish()
    }
}

impl PdfRenderer {
    /// Renderer backed by the given engine
    #[must_use]
    pub fn with_engine(engine: Arc<dyn PdfEngine>) -> Self {
        Self {
            engine: Some(engine),
        }
    }

    /// Renderer that always reports [`RenderError::Disabled`]
    #[must_use]
    pub const fn disabled() -> Self {
        Self { engine: None }
    }

    /// Build the renderer described by configuration
    #[must_use]
    pub fn from_settings(settings: &PdfSettings) -> Self {
        if settings.enabled {
            Self::with_engine(Arc::new(ChromeEngine::new(
                settings.chrome_path.clone(),
                Duration::from_secs(settings.timeout_secs),
            )))
        } else {
            tracing::info!("PDF rendering disabled by configuration");
            Self::disabled()
        }
    }

    /// Whether an engine is available
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.engine.is_some()
    }

    async fn convert(&self, html: String) -> Result<Vec<u8>, RenderError> {
        let engine = self.engine.as_ref().ok_or(RenderError::Disabled)?;
        engine.html_to_pdf(html).await
    }

    /// Render the contact summary for `submission`
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the template or the engine fails. Never
    /// retried.
    pub async fn render_contact(
        &self,
        submission: &ContactSubmission,
        now: NaiveDateTime,
    ) -> Result<RenderedArtifact, RenderError> {
        let html = ContactDocument {
            view: SubmissionView::from(submission),
            generated_at: locale::long_date_time(now),
        }
        .render()?;

        let bytes = self.convert(html).await?;
        let filename =
            locale::artifact_filename(CONTACT_FILENAME_PREFIX, &submission.name, now.date());

        tracing::debug!(filename = %filename, size = bytes.len(), "Contact PDF rendered");
        Ok(RenderedArtifact { filename, bytes })
    }

    /// Render the quote document for `submission`
    ///
    /// # Errors
    ///
    /// Same as [`PdfRenderer::render_contact`].
    pub async fn render_quote(
        &self,
        submission: &ContactSubmission,
        quote: &Quote,
        now: NaiveDateTime,
    ) -> Result<RenderedArtifact, RenderError> {
        let html = QuoteDocument {
            name: submission.display_name(),
            quote,
            generated_on: locale::long_date(now.date()),
            delivery_time: submission
                .timeline
                .as_deref()
                .unwrap_or(DEFAULT_DELIVERY_TIME),
        }
        .render()?;

        let bytes = self.convert(html).await?;
        let filename =
            locale::artifact_filename(QUOTE_FILENAME_PREFIX, &submission.name, now.date());

        tracing::debug!(filename = %filename, size = bytes.len(), "Quote PDF rendered");
        Ok(RenderedArtifact { filename, bytes })
    }
}
