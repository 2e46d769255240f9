//! Application state management
//!
//! Everything a request handler needs is built once at startup and shared
//! through axum state; there are no global singletons.

use crate::{
    config::StratekConfig, email::DeliveryOrchestrator, middleware::RateLimiter,
    pdf::PdfRenderer,
};
use std::sync::Arc;

/// Application state for the Stratek service
///
/// Combines:
/// - Configuration (read once, never reloaded)
/// - The delivery orchestrator with its provider chain
/// - The PDF renderer
/// - The rate limiter and its request log
///
/// # Example
///
/// ```rust,no_run
/// use stratek::{config::StratekConfig, state::AppState};
///
/// # fn example() -> anyhow::Result<()> {
/// let state = AppState::from_config(StratekConfig::load()?);
///
/// // Use in Axum
/// let app: axum::Router = axum::Router::new()
///     .route("/", axum::routing::get(|| async { "Hola" }))
///     .with_state(state);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct AppState {
    /// Application configuration
    config: Arc<StratekConfig>,

    /// Provider chain
    orchestrator: DeliveryOrchestrator,

    /// PDF generation
    pdf: PdfRenderer,

    /// Per-IP request log
    rate_limiter: RateLimiter,
}

impl AppState {
    /// Assemble state from explicit parts
    ///
    /// Tests use this to plug in fake providers and engines.
    #[must_use]
    pub fn new(config: StratekConfig, orchestrator: DeliveryOrchestrator, pdf: PdfRenderer) -> Self {
        let rate_limiter = RateLimiter::new(config.rate_limit.clone());
        Self {
            config: Arc::new(config),
            orchestrator,
            pdf,
            rate_limiter,
        }
    }

    /// Build the provider chain, renderer and limiter described by `config`
    #[must_use]
    pub fn from_config(config: StratekConfig) -> Self {
        let orchestrator = DeliveryOrchestrator::from_settings(&config.email);
        let pdf = PdfRenderer::from_settings(&config.pdf);
        Self::new(config, orchestrator, pdf)
    }

    /// Get configuration reference
    #[must_use]
    pub fn config(&self) -> &StratekConfig {
        &self.config
    }

    /// Get the delivery orchestrator
    #[must_use]
    pub const fn orchestrator(&self) -> &DeliveryOrchestrator {
        &self.orchestrator
    }

    /// Get the PDF renderer
    #[must_use]
    pub const fn pdf(&self) -> &PdfRenderer {
        &self.pdf
    }

    /// Get the rate limiter
    #[must_use]
    pub const fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }
}
