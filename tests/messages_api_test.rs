use chirpy::core::prompt::interpretation_prompt;
use chirpy::domain::ports::ChatClient;
use chirpy::utils::error::ErrorCategory;
use chirpy::{AnthropicClient, ChirpyError, Dialogue, RequestSettings, Vocabulary};
use httpmock::prelude::*;
use serde_json::json;

fn reply(text: &str) -> serde_json::Value {
    json!({
        "id": "msg_01XFDUDYJgAACzvnptvVoYEL",
        "type": "message",
        "role": "assistant",
        "model": "claude-3-5-sonnet-20241022",
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 812, "output_tokens": 40}
    })
}

/// 同一段描述與類別一定送出完全相同的請求本體
#[tokio::test]
async fn test_request_payload_is_exact() {
    let vocabulary = Vocabulary::default();
    let prompt = interpretation_prompt("small bird with a black cap", Some("size"), &vocabulary);

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/messages")
            .header("x-api-key", "sk-test")
            .header("anthropic-version", "2023-06-01")
            .json_body(json!({
                "model": "claude-3-5-sonnet-20241022",
                "max_tokens": 1000,
                "temperature": 0.0,
                "messages": [{
                    "role": "user",
                    "content": [{"type": "text", "text": prompt}]
                }]
            }));
        then.status(200).json_body(reply(
            "<bird_sighting>\n    <size>small</size>\n    <pattern_markings>black cap</pattern_markings>\n</bird_sighting>",
        ));
    });

    let client = AnthropicClient::new(server.url("/v1/messages"), "sk-test");
    let dialogue = Dialogue::new(client, RequestSettings::default(), vocabulary);

    let interpretation = dialogue
        .interpret("small bird with a black cap", Some("size"))
        .await
        .unwrap();

    api_mock.assert();
    assert!(interpretation.raw.starts_with("<bird_sighting>"));
    assert_eq!(interpretation.sighting.categories["size"], ["small"]);
    assert_eq!(
        interpretation.sighting.categories["pattern_markings"],
        ["black cap"]
    );
}

#[tokio::test]
async fn test_authentication_failure_surfaces_api_message() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/v1/messages");
        then.status(401).json_body(json!({
            "type": "error",
            "error": {"type": "authentication_error", "message": "invalid x-api-key"}
        }));
    });

    let client = AnthropicClient::new(server.url("/v1/messages"), "wrong-key");
    let request = RequestSettings::default().request("hello".to_string());
    let err = client.send(&request).await.unwrap_err();

    api_mock.assert();
    match &err {
        ChirpyError::ApiStatusError { status, message } => {
            assert_eq!(*status, 401);
            assert_eq!(message, "invalid x-api-key (authentication_error)");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.category(), ErrorCategory::Network);
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/v1/messages");
        then.status(529).body("Overloaded");
    });

    let client = AnthropicClient::new(server.url("/v1/messages"), "sk-test");
    let request = RequestSettings::default().request("hello".to_string());
    let err = client.send(&request).await.unwrap_err();

    api_mock.assert_hits(1);
    assert!(matches!(err, ChirpyError::ApiStatusError { status: 529, .. }));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_non_json_success_body_is_parsing_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/messages");
        then.status(200).body("<html>gateway</html>");
    });

    let client = AnthropicClient::new(server.url("/v1/messages"), "sk-test");
    let request = RequestSettings::default().request("hello".to_string());
    let err = client.send(&request).await.unwrap_err();

    assert!(matches!(err, ChirpyError::ResponseParsingError { .. }));
}

#[tokio::test]
async fn test_connection_refused_is_api_error() {
    // 保留一個沒有服務在聽的位址
    let client = AnthropicClient::new("http://127.0.0.1:9/v1/messages", "sk-test");
    let request = RequestSettings::default().request("hello".to_string());
    let err = client.send(&request).await.unwrap_err();

    assert!(matches!(err, ChirpyError::ApiError(_)));
    assert_eq!(err.category(), ErrorCategory::Network);
}
