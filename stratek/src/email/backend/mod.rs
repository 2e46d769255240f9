//! Email backend implementations
//!
//! This module provides the delivery backends, in fallback priority order:
//! - **`SendGrid`**: HTTP API (primary)
//! - **SMTP**: Mailgun relay and Gmail, both through `lettre`

pub mod sendgrid;
pub mod smtp;
