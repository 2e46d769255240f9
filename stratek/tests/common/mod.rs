//! Shared fakes for the integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use stratek::config::StratekConfig;
use stratek::email::{DeliveryOrchestrator, EmailProvider, OutboundEmail, ProviderError, SentReceipt};
use stratek::pdf::{PdfEngine, PdfRenderer, RenderError};
use stratek::server;
use stratek::state::AppState;

/// Provider that records every email it is handed
#[derive(Clone)]
pub struct FakeProvider {
    name: &'static str,
    healthy: bool,
    sent: Arc<Mutex<Vec<OutboundEmail>>>,
}

impl FakeProvider {
    pub fn healthy(name: &'static str) -> Self {
        Self {
            name,
            healthy: true,
            sent: Arc::default(),
        }
    }

    pub fn failing(name: &'static str) -> Self {
        Self {
            healthy: false,
            ..Self::healthy(name)
        }
    }

    /// Emails this provider was asked to send, failed attempts included
    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl EmailProvider for FakeProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn send(&self, email: &OutboundEmail) -> Result<SentReceipt, ProviderError> {
        self.sent.lock().unwrap().push(email.clone());
        if self.healthy {
            Ok(SentReceipt {
                provider: self.name,
                message_id: Some(format!("{}-1", self.name)),
            })
        } else {
            Err(ProviderError::transport("connection refused"))
        }
    }
}

/// PDF engine that never launches a browser
#[derive(Clone, Default)]
pub struct FakeEngine {
    broken: bool,
    calls: Arc<AtomicUsize>,
}

impl FakeEngine {
    pub fn working() -> Self {
        Self::default()
    }

    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PdfEngine for FakeEngine {
    async fn html_to_pdf(&self, html: String) -> Result<Vec<u8>, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.broken {
            Err(RenderError::engine("browser crashed"))
        } else {
            Ok(format!("%PDF-1.7 {}", html.len()).into_bytes())
        }
    }
}

/// Router over the given fakes with default configuration
pub fn app(providers: &[FakeProvider], engine: &FakeEngine) -> Router {
    app_with_config(StratekConfig::default(), providers, engine)
}

pub fn app_with_config(
    config: StratekConfig,
    providers: &[FakeProvider],
    engine: &FakeEngine,
) -> Router {
    let chain: Vec<Arc<dyn EmailProvider>> = providers
        .iter()
        .cloned()
        .map(|p| Arc::new(p) as Arc<dyn EmailProvider>)
        .collect();

    server::router(AppState::new(
        config,
        DeliveryOrchestrator::new(chain),
        PdfRenderer::with_engine(Arc::new(engine.clone())),
    ))
}
