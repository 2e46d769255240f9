//! Raw form payload and the normalized submission built from it

use serde::{Deserialize, Serialize};

use super::validation::{validate_email, ValidationError};

/// Placeholder shown wherever an optional field was left empty
pub const NOT_SPECIFIED: &str = "No especificado";

/// Request urgency chosen in the form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Priority {
    /// Answer within hours
    Alta,
    /// Default
    #[default]
    Media,
    /// No rush
    Baja,
}

impl Priority {
    /// Parse a priority, falling back to [`Priority::Media`] for anything
    /// unrecognised
    #[must_use]
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(|p| p.trim().to_lowercase()).as_deref() {
            Some("alta") => Self::Alta,
            Some("baja") => Self::Baja,
            _ => Self::Media,
        }
    }

    /// Display label (`Alta`, `Media`, `Baja`)
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Alta => "Alta",
            Self::Media => "Media",
            Self::Baja => "Baja",
        }
    }

    /// Marker used in notification subjects
    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Alta => "🔴",
            Self::Media => "🟡",
            Self::Baja => "🟢",
        }
    }

    /// CSS class suffix used by the templates
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Alta => "high",
            Self::Media => "medium",
            Self::Baja => "low",
        }
    }

    /// Inline style for the priority banner in notification emails
    #[must_use]
    pub const fn alert_style(self) -> &'static str {
        match self {
            Self::Alta => "background: #fee2e2; color: #dc2626; border-left: 4px solid #ef4444;",
            Self::Media => "background: #fef3c7; color: #f59e0b; border-left: 4px solid #f59e0b;",
            Self::Baja => "background: #dcfce7; color: #16a34a; border-left: 4px solid #22c55e;",
        }
    }
}

/// JSON body posted by the website form
///
/// Field names follow the Spanish form labels. Every field is optional at
/// this stage; requirements are enforced when converting into a submission.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContactForm {
    /// Full name
    pub nombre: Option<String>,
    /// Reply address
    pub email: Option<String>,
    /// Requested service
    pub servicio: Option<String>,
    /// Budget range
    pub presupuesto: Option<String>,
    /// Free text message
    pub mensaje: Option<String>,
    /// Phone number
    pub telefono: Option<String>,
    /// Company name
    pub empresa: Option<String>,
    /// Desired timeline
    pub timeline: Option<String>,
    /// `Alta`, `Media` or `Baja`
    pub priority: Option<String>,
}

/// A validated contact request
///
/// Built once per request from a [`ContactForm`]; every optional field is
/// either `None` or a non-blank trimmed string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    /// Full name
    pub name: String,
    /// Reply address
    pub email: String,
    /// Phone number
    pub phone: Option<String>,
    /// Company name
    pub company: Option<String>,
    /// Requested service
    pub service: Option<String>,
    /// Budget range
    pub budget: Option<String>,
    /// Desired timeline
    pub timeline: Option<String>,
    /// Urgency
    pub priority: Priority,
    /// Free text message, empty when the form had none
    pub message: String,
}

/// A validated quote request: a submission with a known service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteSubmission {
    /// Contact details and free text
    pub contact: ContactSubmission,
    /// Requested service (catalogue lookup key)
    pub service: String,
}

fn clean(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

fn missing(required: &[(&'static str, Option<&String>)]) -> Vec<&'static str> {
    required
        .iter()
        .filter(|(_, value)| clean(*value).is_none())
        .map(|(field, _)| *field)
        .collect()
}

impl ContactForm {
    fn build(&self, message: String) -> Result<ContactSubmission, ValidationError> {
        let email = clean(self.email.as_ref()).unwrap_or_default();
        validate_email(&email)?;

        Ok(ContactSubmission {
            name: clean(self.nombre.as_ref()).unwrap_or_default(),
            email,
            phone: clean(self.telefono.as_ref()),
            company: clean(self.empresa.as_ref()),
            service: clean(self.servicio.as_ref()),
            budget: clean(self.presupuesto.as_ref()),
            timeline: clean(self.timeline.as_ref()),
            priority: Priority::parse_lenient(self.priority.as_deref()),
            message,
        })
    }

    /// Validate the form for `POST /api/contact`
    ///
    /// `nombre`, `email` and `mensaje` must be present and non-blank, and
    /// the email must look like an address.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingFields`] listing every blank required
    /// field, or [`ValidationError::InvalidEmail`].
    pub fn into_contact_submission(self) -> Result<ContactSubmission, ValidationError> {
        let missing = missing(&[
            ("nombre", self.nombre.as_ref()),
            ("email", self.email.as_ref()),
            ("mensaje", self.mensaje.as_ref()),
        ]);
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let message = clean(self.mensaje.as_ref()).unwrap_or_default();
        self.build(message)
    }

    /// Validate the form for `POST /api/quote`
    ///
    /// `nombre`, `email` and `servicio` must be present and non-blank.
    ///
    /// # Errors
    ///
    /// Same as [`ContactForm::into_contact_submission`].
    pub fn into_quote_submission(self) -> Result<QuoteSubmission, ValidationError> {
        let missing = missing(&[
            ("nombre", self.nombre.as_ref()),
            ("email", self.email.as_ref()),
            ("servicio", self.servicio.as_ref()),
        ]);
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let message = clean(self.mensaje.as_ref()).unwrap_or_default();
        let contact = self.build(message)?;
        let service = contact.service.clone().unwrap_or_default();
        Ok(QuoteSubmission { contact, service })
    }
}

impl ContactSubmission {
    /// Name for subjects and filenames (`Cliente` when blank)
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Cliente"
        } else {
            &self.name
        }
    }

    /// Whether the submitter wrote a message
    #[must_use]
    pub fn has_message(&self) -> bool {
        !self.message.is_empty()
    }
}
