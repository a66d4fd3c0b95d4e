//! Gemini backend contract tests.
//!
//! Verify the HTTP request shape, response parsing and error mapping of
//! `GeminiBackend` against a mock server.

use std::time::Duration;

use serde_json::json;
use wand::respond::{GeminiBackend, GeminiConfig, ModelBackend, ModelError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

fn backend(server: &MockServer) -> GeminiBackend {
    GeminiBackend::new(GeminiConfig::new("test-key", "gemini-1.5-flash").with_base_url(server.uri()))
        .unwrap()
}

fn text_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    }))
}

#[tokio::test]
async fn request_carries_key_and_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "Tell me a joke" }] }]
        })))
        .respond_with(text_response("Why did the crab never share?"))
        .expect(1)
        .mount(&server)
        .await;

    let answer = backend(&server).generate("Tell me a joke").await.unwrap();
    assert_eq!(answer, "Why did the crab never share?");
}

#[tokio::test]
async fn answer_is_trimmed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(text_response("\n  Hola mundo  \n"))
        .mount(&server)
        .await;

    assert_eq!(backend(&server).generate("translate").await.unwrap(), "Hola mundo");
}

#[tokio::test]
async fn missing_candidates_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&server)
        .await;

    let err = backend(&server).generate("x").await.unwrap_err();
    assert_eq!(err.code(), "EMPTY_RESPONSE");
}

#[tokio::test]
async fn bad_key_maps_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "API key not valid.", "status": "PERMISSION_DENIED" }
        })))
        .mount(&server)
        .await;

    let err = backend(&server).generate("x").await.unwrap_err();
    assert!(matches!(err, ModelError::Auth(_)));
    assert!(err.message().contains("API key not valid."));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn quota_maps_to_request_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_string("Resource exhausted"))
        .mount(&server)
        .await;

    let err = backend(&server).generate("x").await.unwrap_err();
    assert_eq!(err.code(), "REQUEST_FAILED");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn server_error_maps_to_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let err = backend(&server).generate("x").await.unwrap_err();
    assert_eq!(err.code(), "PROVIDER_ERROR");
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(text_response("late").set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let backend = GeminiBackend::new(
        GeminiConfig::new("test-key", "gemini-1.5-flash")
            .with_base_url(server.uri())
            .with_timeout(Duration::from_millis(200)),
    )
    .unwrap();
    let err = backend.generate("x").await.unwrap_err();
    assert_eq!(err.code(), "TIMEOUT_ERROR");
}
