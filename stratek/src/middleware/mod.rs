//! Middleware layers for the Stratek service
//!
//! Provides middleware for:
//! - Rate limiting (per-IP request window on the form endpoints)

pub mod rate_limit;

pub use rate_limit::{RateLimitError, RateLimiter};
