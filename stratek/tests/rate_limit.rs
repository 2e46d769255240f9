//! Integration tests for per-IP rate limiting of the form endpoints

mod common;

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::Router;
use http::{header::CONTENT_TYPE, Request, StatusCode};
use serde_json::{json, Value};
use stratek::config::StratekConfig;
use tower::ServiceExt;

use common::{app, app_with_config, FakeEngine, FakeProvider};

fn contact_request(uri: &str, ip: [u8; 4]) -> Request<Body> {
    let body = json!({
        "nombre": "Ana",
        "email": "ana@x.com",
        "mensaje": "Necesito una web",
        "servicio": "Consultoría Digital"
    });

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .extension(ConnectInfo(SocketAddr::from((ip, 40_000))))
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn status(app: &Router, uri: &str, ip: [u8; 4]) -> StatusCode {
    app.clone()
        .oneshot(contact_request(uri, ip))
        .await
        .unwrap()
        .status()
}

#[tokio::test(start_paused = true)]
async fn test_eleventh_request_is_rejected() {
    let provider = FakeProvider::healthy("sendgrid");
    let app = app(&[provider.clone()], &FakeEngine::working());
    let client = [203, 0, 113, 7];

    for _ in 0..10 {
        assert_eq!(status(&app, "/api/contact", client).await, StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(contact_request("/api/contact", client))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()["retry-after"], "60");
    assert_eq!(response.headers()["x-ratelimit-limit"], "10");

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Too many requests");
    assert_eq!(body["retryAfter"], 60);

    // The rejected request never reached the pipeline
    assert_eq!(provider.calls(), 10);
}

#[tokio::test(start_paused = true)]
async fn test_window_expiry_allows_again() {
    let app = app(&[], &FakeEngine::working());
    let client = [198, 51, 100, 1];

    for _ in 0..10 {
        status(&app, "/api/contact", client).await;
    }
    assert_eq!(
        status(&app, "/api/contact", client).await,
        StatusCode::TOO_MANY_REQUESTS
    );

    tokio::time::advance(Duration::from_secs(61)).await;
    assert_eq!(status(&app, "/api/contact", client).await, StatusCode::OK);
}

#[tokio::test(start_paused = true)]
async fn test_clients_are_limited_independently() {
    let mut config = StratekConfig::default();
    config.rate_limit.max_requests = 2;
    let app = app_with_config(config, &[], &FakeEngine::working());

    let first = [192, 0, 2, 1];
    let second = [192, 0, 2, 2];

    assert_eq!(status(&app, "/api/contact", first).await, StatusCode::OK);
    assert_eq!(status(&app, "/api/quote", first).await, StatusCode::OK);
    assert_eq!(
        status(&app, "/api/contact", first).await,
        StatusCode::TOO_MANY_REQUESTS
    );

    assert_eq!(status(&app, "/api/contact", second).await, StatusCode::OK);
}

#[tokio::test(start_paused = true)]
async fn test_disabled_limiter_lets_everything_through() {
    let mut config = StratekConfig::default();
    config.rate_limit.enabled = false;
    config.rate_limit.max_requests = 1;
    let app = app_with_config(config, &[], &FakeEngine::working());

    for _ in 0..5 {
        assert_eq!(
            status(&app, "/api/contact", [10, 0, 0, 1]).await,
            StatusCode::OK
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_health_is_outside_the_limiter() {
    let mut config = StratekConfig::default();
    config.rate_limit.max_requests = 1;
    let app = app_with_config(config, &[], &FakeEngine::working());
    let client = [10, 0, 0, 2];

    assert_eq!(status(&app, "/api/contact", client).await, StatusCode::OK);
    assert_eq!(
        status(&app, "/api/contact", client).await,
        StatusCode::TOO_MANY_REQUESTS
    );

    let health = Request::builder()
        .uri("/health")
        .extension(ConnectInfo(SocketAddr::from((client, 40_000))))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(health).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
