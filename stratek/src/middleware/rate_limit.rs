//! Rate limiting middleware
//!
//! Per-IP request limiting for the form endpoints. Each client IP keeps the
//! timestamps of its recent requests; a request is allowed while fewer than
//! `max_requests` of them fall inside the last `window_secs` seconds.
//!
//! The table lives in process memory only. It is neither shared between
//! instances nor persisted across restarts.
//!
//! # Example
//!
//! ```rust,no_run
//! use stratek::middleware::rate_limit::RateLimiter;
//! use stratek::config::RateLimitSettings;
//! use axum::{Router, routing::post};
//!
//! let rate_limit = RateLimiter::new(RateLimitSettings::default());
//!
//! let app: Router = Router::new()
//!     .route("/api/contact", post(|| async { "ok" }))
//!     .route_layer(axum::middleware::from_fn_with_state(
//!         rate_limit,
//!         RateLimiter::middleware,
//!     ));
//! ```

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::RateLimitSettings;

/// Key used when the peer address is unknown
const UNKNOWN_CLIENT: &str = "unknown";

/// In-memory request log keyed by client IP
type RequestLog = Arc<RwLock<HashMap<String, VecDeque<Instant>>>>;

/// Rate limiting middleware
///
/// Cloning is cheap; clones share the same request log.
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimitSettings,
    requests: RequestLog,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn prune(timestamps: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while timestamps
        .front()
        .is_some_and(|oldest| now.duration_since(*oldest) >= window)
    {
        timestamps.pop_front();
    }
}

impl RateLimiter {
    /// Create a new rate limiter
    #[must_use]
    pub fn new(config: RateLimitSettings) -> Self {
        Self {
            config,
            requests: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn window(&self) -> Duration {
        Duration::from_secs(self.config.window_secs)
    }

    /// Record a request from `key` if it is within the limit
    ///
    /// Prunes timestamps older than the window, compares the remaining
    /// count with the limit and, when allowed, appends the current time.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError::Exceeded`] with the time until the oldest
    /// recorded request leaves the window.
    pub async fn allow(&self, key: &str) -> Result<(), RateLimitError> {
        let now = Instant::now();
        let window = self.window();
        let limit = self.config.max_requests;

        // Prune, compare and append under one write lock, then release it
        let outcome = {
            let mut requests = self.requests.write().await;
            let timestamps = requests.entry(key.to_string()).or_default();
            prune(timestamps, now, window);

            if timestamps.len() < limit as usize {
                timestamps.push_back(now);
                Ok(timestamps.len())
            } else {
                let oldest = timestamps.front().copied().unwrap_or(now);
                Err(window.saturating_sub(now.duration_since(oldest)))
            }
        };

        match outcome {
            Ok(count) => {
                debug!(key = %key, count = count, limit = limit, "Rate limit check passed");
                Ok(())
            }
            Err(remaining) => {
                // Round up to whole seconds, never less than one
                let retry_after = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
                let retry_after = Duration::from_secs(retry_after.max(1));
                warn!(
                    key = %key,
                    limit = limit,
                    window_secs = self.config.window_secs,
                    retry_after_secs = retry_after.as_secs(),
                    "Rate limit exceeded"
                );
                Err(RateLimitError::Exceeded {
                    limit,
                    window,
                    retry_after,
                })
            }
        }
    }

    /// Middleware function to enforce rate limits
    ///
    /// Keys requests by peer IP taken from `ConnectInfo`; requests without
    /// connection info share a single `unknown` bucket.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError`] once the caller has used up its window;
    /// it renders as `429 Too Many Requests` with a `Retry-After` header.
    pub async fn middleware(
        State(rate_limit): State<Self>,
        request: Request,
        next: Next,
    ) -> Result<Response, RateLimitError> {
        // Skip if rate limiting is disabled
        if !rate_limit.config.enabled {
            return Ok(next.run(request).await);
        }

        let key = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map_or_else(
                || UNKNOWN_CLIENT.to_string(),
                |ConnectInfo(addr)| addr.ip().to_string(),
            );

        rate_limit.allow(&key).await?;

        Ok(next.run(request).await)
    }

    /// Cleanup expired entries from the request log
    ///
    /// Drops every IP whose timestamps have all left the window. Returns the
    /// number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let window = self.window();

        let removed = {
            let mut requests = self.requests.write().await;
            let before_count = requests.len();

            requests.retain(|_, timestamps| {
                prune(timestamps, now, window);
                !timestamps.is_empty()
            });

            before_count - requests.len()
        }; // Drop the write lock here

        if removed > 0 {
            debug!(removed = removed, "Cleaned up expired rate limit entries");
        }

        removed
    }

    /// Run [`RateLimiter::cleanup_expired`] every `cleanup_interval_secs`
    ///
    /// The task runs until aborted or the runtime shuts down.
    #[must_use]
    pub fn spawn_cleanup(&self) -> JoinHandle<()> {
        let limiter = self.clone();
        let period = Duration::from_secs(self.config.cleanup_interval_secs.max(1));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                limiter.cleanup_expired().await;
            }
        })
    }

    /// Number of client IPs currently tracked
    pub async fn tracked_clients(&self) -> usize {
        self.requests.read().await.len()
    }
}

/// Rate limit errors
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    /// Rate limit exceeded
    #[error("Rate limit exceeded: {limit} requests per {window:?}")]
    Exceeded {
        /// Maximum requests allowed
        limit: u32,
        /// Time window
        window: Duration,
        /// Time until a new request will be accepted
        retry_after: Duration,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RateLimitBody {
    success: bool,
    message: &'static str,
    retry_after: u64,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        match self {
            Self::Exceeded {
                limit, retry_after, ..
            } => {
                let retry_after = retry_after.as_secs();
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    [
                        ("Retry-After", retry_after.to_string()),
                        ("X-RateLimit-Limit", limit.to_string()),
                    ],
                    Json(RateLimitBody {
                        success: false,
                        message: "Too many requests",
                        retry_after,
                    }),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(RateLimitSettings {
            enabled: true,
            max_requests,
            window_secs,
            cleanup_interval_secs: 300,
        })
    }

    #[test]
    fn test_rate_limit_creation() {
        let rate_limit = RateLimiter::new(RateLimitSettings::default());

        assert!(rate_limit.config.enabled);
        assert_eq!(rate_limit.config.max_requests, 10);
        assert_eq!(rate_limit.window(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_within_limit() {
        let rate_limit = limiter(3, 60);

        for _ in 0..3 {
            assert!(rate_limit.allow("10.0.0.1").await.is_ok());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_exceeded() {
        let rate_limit = limiter(3, 60);

        for _ in 0..3 {
            rate_limit.allow("10.0.0.1").await.unwrap();
        }

        let result = rate_limit.allow("10.0.0.1").await;
        assert!(matches!(result, Err(RateLimitError::Exceeded { limit: 3, .. })));

        // Other clients are unaffected
        assert!(rate_limit.allow("10.0.0.2").await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_tracks_oldest_request() {
        let rate_limit = limiter(2, 60);

        rate_limit.allow("10.0.0.1").await.unwrap();
        tokio::time::advance(Duration::from_secs(20)).await;
        rate_limit.allow("10.0.0.1").await.unwrap();
        tokio::time::advance(Duration::from_secs(10)).await;

        match rate_limit.allow("10.0.0.1").await {
            Err(RateLimitError::Exceeded { retry_after, .. }) => {
                assert_eq!(retry_after, Duration::from_secs(30));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_slides() {
        let rate_limit = limiter(2, 60);

        rate_limit.allow("10.0.0.1").await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        rate_limit.allow("10.0.0.1").await.unwrap();
        assert!(rate_limit.allow("10.0.0.1").await.is_err());

        // The first request leaves the window, freeing one slot
        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(rate_limit.allow("10.0.0.1").await.is_ok());
        assert!(rate_limit.allow("10.0.0.1").await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejections_are_not_recorded() {
        let rate_limit = limiter(1, 60);

        rate_limit.allow("10.0.0.1").await.unwrap();
        for _ in 0..5 {
            assert!(rate_limit.allow("10.0.0.1").await.is_err());
        }

        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(rate_limit.allow("10.0.0.1").await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_expired() {
        let rate_limit = limiter(10, 60);

        for i in 0..5 {
            rate_limit.allow(&format!("10.0.0.{i}")).await.unwrap();
        }
        assert_eq!(rate_limit.tracked_clients().await, 5);

        tokio::time::advance(Duration::from_secs(30)).await;
        rate_limit.allow("10.0.0.9").await.unwrap();
        tokio::time::advance(Duration::from_secs(31)).await;

        let removed = rate_limit.cleanup_expired().await;
        assert_eq!(removed, 5);
        assert_eq!(rate_limit.tracked_clients().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_cleanup_sweeps_periodically() {
        let rate_limit = RateLimiter::new(RateLimitSettings {
            enabled: true,
            max_requests: 10,
            window_secs: 1,
            cleanup_interval_secs: 5,
        });
        rate_limit.allow("10.0.0.1").await.unwrap();

        let handle = rate_limit.spawn_cleanup();
        tokio::time::sleep(Duration::from_secs(6)).await;

        assert_eq!(rate_limit.tracked_clients().await, 0);
        handle.abort();
    }

    #[test]
    fn test_rate_limit_error_response() {
        let response = RateLimitError::Exceeded {
            limit: 10,
            window: Duration::from_secs(60),
            retry_after: Duration::from_secs(42),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["retry-after"], "42");
        assert_eq!(response.headers()["x-ratelimit-limit"], "10");
    }

    #[test]
    fn test_rate_limit_error_display() {
        let error = RateLimitError::Exceeded {
            limit: 100,
            window: Duration::from_secs(60),
            retry_after: Duration::from_secs(1),
        };
        assert!(error.to_string().contains("100"));
        assert!(error.to_string().contains("60"));
    }
}
