//! Contact form model, validation and request extraction
//!
//! # Example
//!
//! ```rust
//! use stratek::contact::{ContactForm, Priority};
//!
//! let form = ContactForm {
//!     nombre: Some("Ana".to_string()),
//!     email: Some("ana@x.com".to_string()),
//!     mensaje: Some("Necesito una web".to_string()),
//!     priority: Some("Alta".to_string()),
//!     ..ContactForm::default()
//! };
//!
//! let submission = form.into_contact_submission().unwrap();
//! assert_eq!(submission.priority, Priority::Alta);
//! ```

mod form;
mod validation;
mod view;

pub use form::{ContactForm, ContactSubmission, Priority, QuoteSubmission, NOT_SPECIFIED};
pub use view::SubmissionView;
pub use validation::{validate_email, ValidationError};

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

/// JSON body extractor whose rejection is the form validation envelope
///
/// Axum's own [`Json`] rejection answers with plain text; this wrapper keeps
/// every 400 in the `{ success, message, fields }` shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormJson<T>(pub T);

impl<T, S> FromRequest<S> for FormJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ValidationError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|err| ValidationError::MalformedBody(err.body_text()))?;

        Ok(Self(data))
    }
}
