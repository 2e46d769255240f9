//! Router assembly and the HTTP server loop
//!
//! `/health` is public. The form endpoints sit behind the per-IP rate
//! limiter. Every route shares the outer layers: request tracing, body size
//! limit, request timeout and a panic guard that answers with the generic
//! 500 envelope.

use std::any::Any;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    response::Response,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::config::StratekConfig;
use crate::error::{ErrorEnvelope, StratekError, INTERNAL_ERROR_MESSAGE};
use crate::handlers::{submit_contact, submit_quote};
use crate::health::health_check;
use crate::middleware::RateLimiter;
use crate::state::AppState;

fn handle_panic(err: &(dyn Any + Send)) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "Request handler panicked");

    ErrorEnvelope::new(INTERNAL_ERROR_MESSAGE)
        .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Build the application router
///
/// # Example
///
/// ```rust,no_run
/// use stratek::{config::StratekConfig, server, state::AppState};
///
/// let app = server::router(AppState::from_config(StratekConfig::default()));
/// ```
pub fn router(state: AppState) -> Router {
    let server = &state.config().server;
    let body_limit = server.body_limit_bytes;
    let timeout = Duration::from_secs(server.request_timeout_secs);

    let forms = Router::new()
        .route("/api/contact", post(submit_contact))
        .route("/api/quote", post(submit_quote))
        .route_layer(middleware::from_fn_with_state(
            state.rate_limiter().clone(),
            RateLimiter::middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(forms)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(|err: Box<dyn Any + Send>| handle_panic(&*err)))
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl-C or SIGTERM
///
/// # Errors
///
/// Returns [`StratekError::Io`] if the listener cannot be bound or the
/// server loop fails.
pub async fn serve(config: StratekConfig) -> Result<(), StratekError> {
    let address = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::from_config(config);

    let cleanup = state
        .config()
        .rate_limit
        .enabled
        .then(|| state.rate_limiter().spawn_cleanup());

    let app = router(state);

    let listener = TcpListener::bind(&address).await?;
    info!(address = %address, "Stratek contact service listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if let Some(handle) = cleanup {
        handle.abort();
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
