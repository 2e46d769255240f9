//! Notification email templates and subjects

use askama::Template;

use crate::contact::{ContactSubmission, SubmissionView};
use crate::quote::Quote;

/// Notification sent to the site owner for a contact request
#[derive(Template)]
#[template(path = "email/contact.html")]
pub struct ContactEmail<'a> {
    /// Submission being reported
    pub view: SubmissionView<'a>,
    /// Long Spanish date and time of reception
    pub generated_at: String,
    /// A PDF summary is attached
    pub has_attachment: bool,
}

/// Quote email sent to the owner with the client in CC
#[derive(Template)]
#[template(path = "email/quote.html")]
pub struct QuoteEmail<'a> {
    /// Client name
    pub name: &'a str,
    /// Computed quote
    pub quote: &'a Quote,
    /// The quote PDF is attached
    pub has_attachment: bool,
}

/// `🔴 Nueva solicitud de contacto - Ana | Stratek`
#[must_use]
pub fn contact_subject(submission: &ContactSubmission) -> String {
    format!(
        "{} Nueva solicitud de contacto - {} | Stratek",
        submission.priority.emoji(),
        submission.display_name()
    )
}

/// `💰 Presupuesto para Ana - €800 | Stratek`
#[must_use]
pub fn quote_subject(submission: &ContactSubmission, quote: &Quote) -> String {
    format!(
        "💰 Presupuesto para {} - €{} | Stratek",
        submission.display_name(),
        quote.total
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::Priority;
    use crate::quote::calculate_quote;
    use chrono::NaiveDate;

    fn submission(priority: Priority, phone: Option<&str>) -> ContactSubmission {
        ContactSubmission {
            name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            phone: phone.map(ToString::to_string),
            company: None,
            service: Some("Desarrollo Web".to_string()),
            budget: None,
            timeline: None,
            priority,
            message: "Necesito una web\ncon blog".to_string(),
        }
    }

    #[test]
    fn test_contact_subject_emoji_per_priority() {
        assert_eq!(
            contact_subject(&submission(Priority::Alta, None)),
            "🔴 Nueva solicitud de contacto - Ana | Stratek"
        );
        assert!(contact_subject(&submission(Priority::Media, None)).starts_with("🟡"));
        assert!(contact_subject(&submission(Priority::Baja, None)).starts_with("🟢"));
    }

    #[test]
    fn test_subject_uses_cliente_for_blank_name() {
        let mut s = submission(Priority::Media, None);
        s.name.clear();
        assert_eq!(
            contact_subject(&s),
            "🟡 Nueva solicitud de contacto - Cliente | Stratek"
        );
    }

    #[test]
    fn test_contact_email_links() {
        let with_phone = submission(Priority::Alta, Some("+34 600 000 000"));
        let html = ContactEmail {
            view: SubmissionView::from(&with_phone),
            generated_at: "19 de octubre de 2026, 14:30".to_string(),
            has_attachment: true,
        }
        .render()
        .unwrap();

        assert!(html.contains("mailto:ana@x.com"));
        assert!(html.contains("tel:+34 600 000 000"));
        assert!(html.contains("SOLICITUD PRIORITARIA"));
        assert!(html.contains("Se adjunta el PDF"));
        assert!(html.contains("Necesito una web<br"));

        let without_phone = submission(Priority::Media, None);
        let html = ContactEmail {
            view: SubmissionView::from(&without_phone),
            generated_at: String::new(),
            has_attachment: false,
        }
        .render()
        .unwrap();

        assert!(!html.contains("tel:"));
        assert!(!html.contains("SOLICITUD PRIORITARIA"));
        assert!(!html.contains("Se adjunta el PDF"));
    }

    #[test]
    fn test_quote_email_and_subject() {
        let s = submission(Priority::Media, None);
        let quote = calculate_quote("Desarrollo Web", None, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());

        assert_eq!(quote_subject(&s, &quote), "💰 Presupuesto para Ana - €800 | Stratek");

        let html = QuoteEmail {
            name: s.display_name(),
            quote: &quote,
            has_attachment: true,
        }
        .render()
        .unwrap();
        assert!(html.contains("Presupuesto Total: €800"));
        assert!(html.contains("Hola Ana"));
    }
}
