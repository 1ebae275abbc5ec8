use std::time::Duration;

use fitplan::agent::{DIETARY_EXPERT, PLAN_ASSISTANT};
use fitplan::config::LlmConfig;
use fitplan::error::GenerationError;
use fitplan::llm_interaction::{GeminiClient, TextGenerator};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/v1beta/models/gemini-test:generateContent";

fn client_for(server: &MockServer, timeout: Duration) -> GeminiClient {
    let config = LlmConfig::new(
        Some("test-key".to_string()),
        "gemini-test".to_string(),
        server.uri(),
        timeout,
    )
    .unwrap();
    GeminiClient::new(config).unwrap()
}

fn text_response(parts: &[&str]) -> Value {
    let parts: Vec<Value> = parts.iter().map(|text| json!({ "text": text })).collect();
    json!({
        "candidates": [{ "content": { "role": "model", "parts": parts } }],
        "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 40 }
    })
}

#[test_log::test(tokio::test)]
async fn test_generate_sends_key_prompt_and_system_instruction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "Age: 30" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response(&["Breakfast: ", "eggs"])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    let text = client.generate(&DIETARY_EXPERT, "Age: 30").await.unwrap();
    assert_eq!(text, "Breakfast: eggs");

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let system = body["systemInstruction"]["parts"][0]["text"].as_str().unwrap();
    assert!(system.contains("Provides personalized dietary recommendations"));
    assert!(system.contains("- Suggest a detailed meal plan for the day"));
}

#[test_log::test(tokio::test)]
async fn test_plain_agent_sends_no_system_instruction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response(&["Sure."])))
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    client.generate(&PLAN_ASSISTANT, "User Question: ok?").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("systemInstruction").is_none());
}

#[tokio::test]
async fn test_http_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exhausted"))
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    let err = client.generate(&DIETARY_EXPERT, "Age: 30").await.unwrap_err();
    match err {
        GenerationError::Status { status, body, .. } => {
            assert_eq!(status.as_u16(), 429);
            assert_eq!(body, "quota exhausted");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_error_object_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "error": { "code": 400, "message": "API key not valid" } })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    let err = client.generate(&DIETARY_EXPERT, "Age: 30").await.unwrap_err();
    assert!(matches!(err, GenerationError::Api { ref message, .. } if message == "API key not valid"));
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    let err = client.generate(&DIETARY_EXPERT, "Age: 30").await.unwrap_err();
    assert!(matches!(err, GenerationError::Decode { .. }));
}

#[tokio::test]
async fn test_response_without_text_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    let err = client.generate(&DIETARY_EXPERT, "Age: 30").await.unwrap_err();
    assert!(matches!(err, GenerationError::EmptyResponse { .. }));
}

#[tokio::test]
async fn test_client_timeout_is_a_request_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(text_response(&["late"]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_millis(200));
    let err = client.generate(&DIETARY_EXPERT, "Age: 30").await.unwrap_err();
    assert!(matches!(err, GenerationError::Request { .. }));
}
