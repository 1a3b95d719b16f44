use commit_critic::ai::provider::{AIProvider, ChatMessage, ProviderConfig};
use commit_critic::ai::providers::{ClaudeProvider, OpenAIProvider};
use commit_critic::infrastructure::CriticError;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, route: &str) -> ProviderConfig {
    ProviderConfig {
        model: "test-model".to_string(),
        api_key: Some("test-key".to_string()),
        api_url: format!("{}{}", server.uri(), route),
        timeout_secs: 5,
        ..Default::default()
    }
}

fn conversation() -> Vec<ChatMessage> {
    vec![ChatMessage::user("Analyze these commits")]
}

#[tokio::test]
async fn test_claude_sends_headers_and_joins_text_blocks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "system": "You are a reviewer",
            "messages": [{"role": "user", "content": "Analyze these commits"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                {"type": "text", "text": "[{\"hash\": "},
                {"type": "text", "text": "\"abc12345\"}]"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = ClaudeProvider::new()
        .chat("You are a reviewer", &conversation(), &config_for(&server, "/v1/messages"))
        .await
        .unwrap();
    assert_eq!(reply, "[{\"hash\": \"abc12345\"}]");
}

#[tokio::test]
async fn test_claude_unavailable_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let err = ClaudeProvider::new()
        .chat("system", &conversation(), &config_for(&server, "/v1/messages"))
        .await
        .unwrap_err();
    assert!(matches!(err, CriticError::Provider { .. }));
    assert!(err.is_retryable());
    assert!(err.to_string().contains("overloaded"));
}

#[tokio::test]
async fn test_claude_unauthorized_is_not_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid x-api-key"))
        .mount(&server)
        .await;

    let err = ClaudeProvider::new()
        .chat("system", &conversation(), &config_for(&server, "/v1/messages"))
        .await
        .unwrap_err();
    assert!(!err.is_retryable());
    assert!(!err.is_fatal());
}

#[tokio::test]
async fn test_missing_api_key_is_configuration_error() {
    let server = MockServer::start().await;
    let mut config = config_for(&server, "/v1/messages");
    config.api_key = None;

    let err = ClaudeProvider::new()
        .chat("system", &conversation(), &config)
        .await
        .unwrap_err();
    assert!(err.is_fatal());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_openai_prepends_system_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "messages": [
                {"role": "system", "content": "You are a reviewer"},
                {"role": "user", "content": "Analyze these commits"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"type\": \"fix\"}"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = OpenAIProvider::new()
        .chat("You are a reviewer", &conversation(), &config_for(&server, "/v1/chat/completions"))
        .await
        .unwrap();
    assert_eq!(reply, "{\"type\": \"fix\"}");
}

#[tokio::test]
async fn test_openai_rate_limit_and_empty_choices() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let provider = OpenAIProvider::new();
    let limited = provider
        .chat("system", &conversation(), &config_for(&server, "/limited"))
        .await
        .unwrap_err();
    assert!(limited.is_retryable());

    let empty = provider
        .chat("system", &conversation(), &config_for(&server, "/empty"))
        .await
        .unwrap_err();
    assert!(empty.to_string().contains("no choices"));
}
