//! Health check endpoint
//!
//! Reports liveness together with the email providers enabled at startup, so
//! a deploy with missing credentials is visible without sending a form.
//!
//! # Example
//!
//! ```rust,no_run
//! use axum::{Router, routing::get};
//! use stratek::{config::StratekConfig, health::health_check, state::AppState};
//!
//! let state = AppState::from_config(StratekConfig::default());
//! let app: Router = Router::new()
//!     .route("/health", get(health_check))
//!     .with_state(state);
//! ```

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

/// Health check response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResponse {
    /// Always `ok` while the process serves requests
    pub status: &'static str,
    /// Application version
    pub version: &'static str,
    /// Time of the check
    pub timestamp: DateTime<Utc>,
    /// Enabled providers in priority order
    pub providers: Vec<&'static str>,
    /// At least one provider is enabled
    pub has_any_provider: bool,
    /// PDF rendering is enabled
    pub pdf_enabled: bool,
}

impl HealthCheckResponse {
    /// Snapshot of the given state
    #[must_use]
    pub fn from_state(state: &AppState) -> Self {
        let providers = state.orchestrator().provider_names();
        Self {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            timestamp: Utc::now(),
            has_any_provider: !providers.is_empty(),
            providers,
            pdf_enabled: state.pdf().is_enabled(),
        }
    }
}

/// `GET /health`
pub async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse::from_state(&state))
}
