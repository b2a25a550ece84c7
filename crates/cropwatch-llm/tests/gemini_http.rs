//! HTTP-level tests for the Gemini provider against a mock server

use cropwatch_domain::{GenerationRequest, ImageAttachment, LlmProvider};
use cropwatch_llm::{GeminiProvider, LlmError};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/models/gemini-1.5-flash:generateContent";

fn provider(server: &MockServer) -> GeminiProvider {
    GeminiProvider::new("test-key")
        .unwrap()
        .with_endpoint(server.uri())
        .with_backoff_base(Duration::from_millis(1))
}

fn answer(text: &str) -> serde_json::Value {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
}

#[tokio::test]
async fn test_generate_returns_first_candidate_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "predict trends" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(answer("```json\n{}\n```")))
        .expect(1)
        .mount(&server)
        .await;

    let text = provider(&server)
        .generate(&GenerationRequest::text("predict trends"))
        .await
        .unwrap();
    assert_eq!(text, "```json\n{}\n```");
}

#[tokio::test]
async fn test_generate_sends_inline_image() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(body_partial_json(json!({
            "contents": [{
                "parts": [
                    { "text": "check this leaf" },
                    { "inline_data": { "mime_type": "image/png", "data": "iVBORw0" } }
                ]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(answer("looks healthy")))
        .expect(1)
        .mount(&server)
        .await;

    let request = GenerationRequest::text("check this leaf")
        .with_image(ImageAttachment::new("image/png", "iVBORw0"));
    let text = provider(&server).generate(&request).await.unwrap();
    assert_eq!(text, "looks healthy");
}

#[tokio::test]
async fn test_generate_retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(3)
        .mount(&server)
        .await;

    let result = provider(&server)
        .generate(&GenerationRequest::text("hello"))
        .await;
    assert!(matches!(result, Err(LlmError::Communication(ref m)) if m.contains("503")));
}

#[tokio::test]
async fn test_generate_does_not_retry_client_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .expect(1)
        .mount(&server)
        .await;

    let result = provider(&server)
        .generate(&GenerationRequest::text("hello"))
        .await;
    assert!(matches!(result, Err(LlmError::Communication(ref m)) if m.contains("400")));
}

#[tokio::test]
async fn test_generate_reports_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let result = provider(&server)
        .with_max_retries(2)
        .generate(&GenerationRequest::text("hello"))
        .await;
    assert!(matches!(result, Err(LlmError::RateLimitExceeded)));
}

#[tokio::test]
async fn test_generate_unknown_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = provider(&server)
        .with_model("gemini-0")
        .generate(&GenerationRequest::text("hello"))
        .await;
    assert!(matches!(result, Err(LlmError::ModelNotAvailable(ref m)) if m == "gemini-0"));
}

#[tokio::test]
async fn test_generate_empty_candidates_is_empty_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let text = provider(&server)
        .generate(&GenerationRequest::text("hello"))
        .await
        .unwrap();
    assert_eq!(text, "");
}

#[tokio::test]
async fn test_generate_malformed_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = provider(&server)
        .generate(&GenerationRequest::text("hello"))
        .await;
    assert!(matches!(result, Err(LlmError::InvalidResponse(_))));
}
