//! HTML documents fed to the PDF engine

use askama::Template;

use crate::contact::SubmissionView;
use crate::quote::Quote;

/// Delivery time printed when the client gave no timeline
pub const DEFAULT_DELIVERY_TIME: &str = "2-4 semanas";

/// Printable summary of a contact request
#[derive(Template)]
#[template(path = "pdf/contact.html")]
pub struct ContactDocument<'a> {
    /// Submission being summarised
    pub view: SubmissionView<'a>,
    /// Long Spanish date and time of generation
    pub generated_at: String,
}

/// Printable project quote
#[derive(Template)]
#[template(path = "pdf/quote.html")]
pub struct QuoteDocument<'a> {
    /// Client name
    pub name: &'a str,
    /// Computed quote
    pub quote: &'a Quote,
    /// Long Spanish date of generation
    pub generated_on: String,
    /// Requested timeline or the default delivery time
    pub delivery_time: &'a str,
}
