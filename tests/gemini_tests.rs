//! Gemini client tests against a mock Generative Language API

use doc_summary::error::ModelError;
use doc_summary::summarizer::{GeminiClient, LanguageModel, Summarizer, Summary};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::new("test-key", "gemini-1.5-flash", &server.uri())
}

#[tokio::test]
async fn test_successful_generation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "Summarize me" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "A short summary." }] },
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = client_for(&mock_server).generate("Summarize me").await.unwrap();

    assert_eq!(response.text.as_deref(), Some("A short summary."));
    assert_eq!(response.finish_reason.as_deref(), Some("STOP"));
    assert_eq!(response.block_reason, None);
}

#[tokio::test]
async fn test_safety_settings_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(body_partial_json(json!({
            "safetySettings": [
                { "category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE" },
                { "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_MEDIUM_AND_ABOVE" },
                {
                    "category": "HARM_CATEGORY_SEXUALLY_EXPLICIT",
                    "threshold": "BLOCK_MEDIUM_AND_ABOVE"
                },
                {
                    "category": "HARM_CATEGORY_DANGEROUS_CONTENT",
                    "threshold": "BLOCK_MEDIUM_AND_ABOVE"
                }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "ok" }] },
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    client_for(&mock_server).generate("text").await.unwrap();
}

#[tokio::test]
async fn test_prompt_feedback_block() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&mock_server)
        .await;

    let summarizer = Summarizer::new(Arc::new(client_for(&mock_server)));
    let summary = summarizer.summarize("Some documentation").await.unwrap();

    assert_eq!(
        summary,
        Summary::Blocked {
            reason: "SAFETY".to_string()
        }
    );
    assert_eq!(
        String::from(summary),
        "Summary generation blocked due to: SAFETY"
    );
}

#[tokio::test]
async fn test_non_stop_finish_reason() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Partial" }] },
                "finishReason": "MAX_TOKENS"
            }]
        })))
        .mount(&mock_server)
        .await;

    let summarizer = Summarizer::new(Arc::new(client_for(&mock_server)));
    let summary = summarizer.summarize("Some documentation").await.unwrap();

    assert_eq!(
        summary.to_string(),
        "Summary generation failed: finish reason MAX_TOKENS"
    );
}

#[tokio::test]
async fn test_server_error_is_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "code": 500, "message": "Internal error encountered.", "status": "INTERNAL" }
        })))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).generate("text").await.unwrap_err();
    match err {
        ModelError::Api {
            status,
            message,
            block_reason,
        } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Internal error encountered.");
            assert_eq!(block_reason, None);
        }
        other => panic!("expected an API error, got {:?}", other),
    }

    // A hard model failure surfaces from the summarizer as an error
    let summarizer = Summarizer::new(Arc::new(client_for(&mock_server)));
    assert!(summarizer.summarize("text").await.is_err());
}

#[tokio::test]
async fn test_undecodable_body_is_invalid_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy page</html>"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).generate("text").await.unwrap_err();
    assert!(matches!(err, ModelError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_empty_candidates_is_no_valid_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&mock_server)
        .await;

    let summarizer = Summarizer::new(Arc::new(client_for(&mock_server)));
    let summary = summarizer.summarize("Some documentation").await.unwrap();

    assert_eq!(summary, Summary::NoValidResponse);
}
