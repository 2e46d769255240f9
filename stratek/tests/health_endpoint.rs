//! Integration tests for `GET /health`

mod common;

use axum_test::TestServer;
use serde_json::Value;

use common::{app, FakeEngine, FakeProvider};

#[tokio::test]
async fn test_health_lists_providers_in_order() {
    let server = TestServer::new(app(
        &[FakeProvider::healthy("sendgrid"), FakeProvider::healthy("gmail")],
        &FakeEngine::working(),
    ))
    .unwrap();

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["providers"], serde_json::json!(["sendgrid", "gmail"]));
    assert_eq!(body["hasAnyProvider"], true);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_health_without_providers() {
    let server = TestServer::new(app(&[], &FakeEngine::working())).unwrap();

    let body: Value = server.get("/health").await.json();
    assert_eq!(body["providers"], serde_json::json!([]));
    assert_eq!(body["hasAnyProvider"], false);
}

#[tokio::test]
async fn test_health_is_not_rate_limited() {
    let server = TestServer::new(app(&[], &FakeEngine::working())).unwrap();

    for _ in 0..25 {
        server.get("/health").await.assert_status_ok();
    }
}
