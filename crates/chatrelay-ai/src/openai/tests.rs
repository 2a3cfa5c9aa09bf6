//! Request shaping, response parsing and error classification against a
//! local mock server.

use std::time::Duration;

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::model::ModelVariant;
use crate::{AiClient, ImageRef, ProviderError, Turn, TurnContent};

fn client_for(server: &MockServer) -> OpenAiClient {
    let config = OpenAiClientConfig::new("sk-test")
        .with_api_base(format!("{}/v1/", server.uri()))
        .with_timeout(Duration::from_millis(500));
    OpenAiClient::new(config).unwrap()
}

fn ok_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": text }, "finish_reason": "stop" }
        ],
        "usage": { "prompt_tokens": 12, "completion_tokens": 34, "total_tokens": 46 }
    })
}

#[tokio::test]
async fn sends_messages_and_parses_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o",
            "max_tokens": 2000,
            "messages": [
                { "role": "system", "content": "be brief" },
                { "role": "user", "content": "hello" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("hi!")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let messages = vec![Turn::system("be brief"), Turn::user("hello")];
    let completion = client
        .complete(&messages, ModelVariant::Gpt4Omni, 2000)
        .await
        .unwrap();

    assert_eq!(completion.text, "hi!");
    assert_eq!(completion.usage.input_tokens, 12);
    assert_eq!(completion.usage.output_tokens, 34);
    assert_eq!(completion.usage.total_tokens, 46);
}

#[tokio::test]
async fn image_turn_is_sent_as_content_parts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "messages": [
                { "role": "system", "content": "" },
                { "role": "user", "content": [
                    { "type": "text", "text": "what is this?" },
                    { "type": "image_url", "image_url": { "url": "data:image/png;base64,YWJj" } }
                ] }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("a cat")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let messages = vec![
        Turn::system(""),
        Turn::user(TurnContent::TextWithImage {
            text: "what is this?".into(),
            image: ImageRef::from_bytes("image/png", b"abc"),
        }),
    ];
    let completion = client
        .complete(&messages, ModelVariant::Gpt4VisionPreview, 100)
        .await
        .unwrap();
    assert_eq!(completion.text, "a cat");
}

#[tokio::test]
async fn internal_server_error_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .complete(&[Turn::user("x")], ModelVariant::Gpt4Omni, 10)
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Server(_)));
    assert!(err.is_retryable());
    assert!(err.to_string().contains("upstream exploded"));
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ok_body("late"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .complete(&[Turn::user("x")], ModelVariant::Gpt4Omni, 10)
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Timeout(_)), "got {err:?}");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn client_errors_are_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .complete(&[Turn::user("x")], ModelVariant::Gpt4Omni, 10)
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Api(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn rate_limit_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .complete(&[Turn::user("x")], ModelVariant::Gpt4Omni, 10)
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::RateLimited(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn missing_content_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .complete(&[Turn::user("x")], ModelVariant::Gpt4Omni, 10)
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Parse(_)));
}

#[test]
fn total_tokens_derived_when_missing() {
    let client = OpenAiClient::new(OpenAiClientConfig::new("k")).unwrap();
    let completion = client
        .parse_response(serde_json::json!({
            "choices": [ { "message": { "content": "x" } } ],
            "usage": { "prompt_tokens": 3, "completion_tokens": 4 }
        }))
        .unwrap();
    assert_eq!(completion.usage.total_tokens, 7);
}

#[test]
fn config_debug_redacts_key() {
    let config = OpenAiClientConfig::new("sk-secret");
    let dbg = format!("{config:?}");
    assert!(!dbg.contains("sk-secret"));
    assert_eq!(
        config.with_api_base("http://localhost:1/v1/").completions_url(),
        "http://localhost:1/v1/chat/completions"
    );
}
