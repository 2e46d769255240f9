//! stratek: contact-form backend for the Stratek portfolio site
//!
//! Accepts contact and quote requests over HTTP, renders a PDF summary of
//! each one and emails it to the site owner through the first provider that
//! accepts it (`SendGrid`, then Mailgun, then Gmail).
//!
//! # Pipeline
//!
//! Every form request runs the same steps:
//!
//! 1. Validate the JSON body. A failure answers 400 and stops here.
//! 2. Render the PDF. A failure only drops the attachment.
//! 3. Deliver the email through the provider chain. A failure is reported
//!    in the response details.
//! 4. Respond 200 with what happened.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use stratek::{config::StratekConfig, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     stratek::observability::init()?;
//!     let config = StratekConfig::load()?;
//!     server::serve(config).await?;
//!     Ok(())
//! }
//! ```

// Lint configuration is handled at the workspace level in Cargo.toml
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod contact;
pub mod email;
pub mod error;
pub mod handlers;
pub mod health;
pub mod locale;
pub mod middleware;
pub mod observability;
pub mod pdf;
pub mod quote;
pub mod server;
pub mod state;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! # Examples
    //!
    //! ```rust
    //! use stratek::prelude::*;
    //! ```

    pub use crate::config::StratekConfig;
    pub use crate::contact::{ContactForm, ContactSubmission, Priority, QuoteSubmission};
    pub use crate::email::{DeliveryOrchestrator, DeliveryResult, EmailProvider};
    pub use crate::error::StratekError;
    pub use crate::pdf::{PdfEngine, PdfRenderer, RenderedArtifact};
    pub use crate::quote::{calculate_quote, Quote};
    pub use crate::state::AppState;
}
