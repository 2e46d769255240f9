//! Integration tests for `POST /api/contact`

mod common;

use axum_test::TestServer;
use http::StatusCode;
use serde_json::{json, Value};

use common::{app, FakeEngine, FakeProvider};

fn valid_body() -> Value {
    json!({
        "nombre": "Ana",
        "email": "ana@x.com",
        "mensaje": "Necesito una web"
    })
}

#[tokio::test]
async fn test_no_providers_still_answers_200() {
    let server = TestServer::new(app(&[], &FakeEngine::working())).unwrap();

    let response = server.post("/api/contact").json(&valid_body()).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(
        body["message"],
        "Formulario enviado correctamente. Te contactaremos pronto."
    );
    assert_eq!(body["details"]["pdfGenerated"], true);
    assert_eq!(body["details"]["emailSent"], false);
    assert_eq!(body["details"]["emailService"], Value::Null);
    assert_eq!(body["details"]["errors"][0], "No email service configured");
}

#[tokio::test]
async fn test_single_healthy_provider() {
    let gmail = FakeProvider::healthy("gmail");
    let server = TestServer::new(app(&[gmail.clone()], &FakeEngine::working())).unwrap();

    let body: Value = server.post("/api/contact").json(&valid_body()).await.json();

    assert_eq!(body["details"]["emailSent"], true);
    assert_eq!(body["details"]["emailService"], "gmail");
    assert!(body["details"].get("errors").is_none());
    assert!(body["details"]["timestamp"].is_string());
    assert_eq!(gmail.calls(), 1);
}

#[tokio::test]
async fn test_falls_back_to_next_provider() {
    let sendgrid = FakeProvider::failing("sendgrid");
    let mailgun = FakeProvider::healthy("mailgun");
    let gmail = FakeProvider::healthy("gmail");
    let server = TestServer::new(app(
        &[sendgrid.clone(), mailgun.clone(), gmail.clone()],
        &FakeEngine::working(),
    ))
    .unwrap();

    let body: Value = server.post("/api/contact").json(&valid_body()).await.json();

    assert_eq!(body["details"]["emailService"], "mailgun");
    assert_eq!(sendgrid.calls(), 1);
    assert_eq!(mailgun.calls(), 1);
    assert_eq!(gmail.calls(), 0);
}

#[tokio::test]
async fn test_all_providers_failing() {
    let server = TestServer::new(app(
        &[FakeProvider::failing("sendgrid"), FakeProvider::failing("gmail")],
        &FakeEngine::working(),
    ))
    .unwrap();

    let response = server.post("/api/contact").json(&valid_body()).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["details"]["emailSent"], false);
    let error = body["details"]["errors"][0].as_str().unwrap();
    assert!(error.starts_with("gmail:"));
}

#[tokio::test]
async fn test_render_failure_sends_without_attachment() {
    let sendgrid = FakeProvider::healthy("sendgrid");
    let server = TestServer::new(app(&[sendgrid.clone()], &FakeEngine::broken())).unwrap();

    let body: Value = server.post("/api/contact").json(&valid_body()).await.json();

    assert_eq!(body["details"]["pdfGenerated"], false);
    assert_eq!(body["details"]["emailSent"], true);
    assert_eq!(body["details"]["errors"], json!(["Error generating PDF"]));

    let sent = sendgrid.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].attachment.is_none());
}

#[tokio::test]
async fn test_email_carries_pdf_and_reply_to() {
    let sendgrid = FakeProvider::healthy("sendgrid");
    let server = TestServer::new(app(&[sendgrid.clone()], &FakeEngine::working())).unwrap();

    let body = json!({
        "nombre": "Ana María",
        "email": "ana@x.com",
        "mensaje": "Necesito una web",
        "priority": "Alta",
        "telefono": "+34 600 000 000"
    });
    server.post("/api/contact").json(&body).await.assert_status_ok();

    let sent = sendgrid.sent();
    let email = &sent[0];
    assert_eq!(
        email.subject.as_deref(),
        Some("🔴 Nueva solicitud de contacto - Ana María | Stratek")
    );
    assert_eq!(email.reply_to.as_deref(), Some("ana@x.com"));

    let attachment = email.attachment.as_ref().unwrap();
    assert!(attachment.filename.starts_with("Solicitud_Contacto_Ana_María_"));
    assert!(attachment.filename.ends_with(".pdf"));
    assert_eq!(attachment.content_type, "application/pdf");
}

#[tokio::test]
async fn test_invalid_email_is_rejected_without_side_effects() {
    let sendgrid = FakeProvider::healthy("sendgrid");
    let engine = FakeEngine::working();
    let server = TestServer::new(app(&[sendgrid.clone()], &engine)).unwrap();

    let response = server
        .post("/api/contact")
        .json(&json!({ "nombre": "Ana", "email": "ana@", "mensaje": "Hola" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Email inválido");
    assert_eq!(body["fields"], json!(["email"]));

    assert_eq!(sendgrid.calls(), 0);
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_missing_fields_are_listed() {
    let engine = FakeEngine::working();
    let server = TestServer::new(app(&[], &engine)).unwrap();

    let response = server
        .post("/api/contact")
        .json(&json!({ "nombre": "  ", "email": "ana@x.com" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["fields"], json!(["nombre", "mensaje"]));
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_malformed_json_uses_the_envelope() {
    let server = TestServer::new(app(&[], &FakeEngine::working())).unwrap();

    let response = server
        .post("/api/contact")
        .content_type("application/json")
        .text("{ not json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Datos del formulario inválidos");
}
