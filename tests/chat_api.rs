use httpmock::Method::POST;
use httpmock::MockServer;
use serde_json::json;

use mcpbench::api::{ChatApi, ChatRequest, HttpChatApi, Message};
use mcpbench::error::BenchError;

fn request() -> ChatRequest {
    ChatRequest::new("gpt-4o-mini", vec![Message::user("hello")], None)
}

#[tokio::test]
async fn completion_parses_message_and_usage() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .header("authorization", "Bearer test-key")
            .header("content-type", "application/json")
            .body_contains("\"model\":\"gpt-4o-mini\"")
            .body_contains("\"temperature\":0.0");
        then.status(200).json_body(json!({
            "choices": [{ "message": { "content": "hello back" } }],
            "usage": { "prompt_tokens": 9, "completion_tokens": 3, "total_tokens": 12 }
        }));
    });

    let api = HttpChatApi::new("test-key", &server.url("/v1/chat/completions")).unwrap();
    let response = api.complete(&request()).await.unwrap();

    mock.assert();
    assert_eq!(
        response.first_message().unwrap().content.as_deref(),
        Some("hello back")
    );
    let usage = response.usage.unwrap();
    assert_eq!(usage.prompt_tokens, 9);
    assert_eq!(usage.completion_tokens, 3);
}

#[tokio::test]
async fn non_success_status_is_a_fatal_api_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(429).body("rate limited");
    });

    let api = HttpChatApi::new("test-key", &server.url("/v1/chat/completions")).unwrap();
    let err = api.complete(&request()).await.unwrap_err();

    match err {
        BenchError::ApiError { status, message } => {
            assert_eq!(status, 429);
            assert_eq!(message, "rate limited");
        }
        other => panic!("expected ApiError, got {}", other),
    }
}
