//! Template-facing view of a submission

use super::form::{ContactSubmission, NOT_SPECIFIED};

/// Flattened, placeholder-filled view of a [`ContactSubmission`]
///
/// Shared by the PDF and email templates. Values are raw text; escaping is
/// left to the templates.
#[derive(Debug, Clone)]
pub struct SubmissionView<'a> {
    /// Name or `Cliente`
    pub name: &'a str,
    /// Reply address
    pub email: &'a str,
    /// Phone or placeholder
    pub phone: &'a str,
    /// Raw phone for `tel:` links
    pub phone_link: Option<&'a str>,
    /// Company or placeholder
    pub company: &'a str,
    /// Service or placeholder
    pub service: &'a str,
    /// Budget or placeholder
    pub budget: &'a str,
    /// Timeline or placeholder
    pub timeline: &'a str,
    /// `Alta`, `Media` or `Baja`
    pub priority: &'static str,
    /// Priority in capitals for the PDF
    pub priority_upper: String,
    /// CSS class suffix for the priority
    pub priority_class: &'static str,
    /// Inline style of the email priority banner
    pub priority_style: &'static str,
    /// Priority is `Alta`
    pub is_urgent: bool,
    /// Message body
    pub message: &'a str,
    /// A message was provided
    pub has_message: bool,
}

fn or_placeholder(value: Option<&String>) -> &str {
    value.map_or(NOT_SPECIFIED, String::as_str)
}

impl<'a> From<&'a ContactSubmission> for SubmissionView<'a> {
    fn from(submission: &'a ContactSubmission) -> Self {
        let priority = submission.priority;
        Self {
            name: submission.display_name(),
            email: &submission.email,
            phone: or_placeholder(submission.phone.as_ref()),
            phone_link: submission.phone.as_deref(),
            company: or_placeholder(submission.company.as_ref()),
            service: or_placeholder(submission.service.as_ref()),
            budget: or_placeholder(submission.budget.as_ref()),
            timeline: or_placeholder(submission.timeline.as_ref()),
            priority: priority.label(),
            priority_upper: priority.label().to_uppercase(),
            priority_class: priority.css_class(),
            priority_style: priority.alert_style(),
            is_urgent: priority == super::Priority::Alta,
            message: &submission.message,
            has_message: submission.has_message(),
        }
    }
}
