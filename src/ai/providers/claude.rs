use super::{request_error, status_error};
use crate::ai::http::shared_client;
use crate::ai::provider::{AIProvider, ChatMessage, ProviderConfig};
use crate::infrastructure::{CriticError, CriticResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PROVIDER_NAME: &str = "anthropic";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API 请求
#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

/// Anthropic 消息
#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Anthropic 非流式响应
#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
}

/// Anthropic 内容块
#[derive(Deserialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type")]
    _type: String,
    text: Option<String>,
}

/// Claude (Anthropic) AI 提供商
///
/// 使用 Anthropic Messages API，非 OpenAI 兼容格式。
/// 默认 URL: https://api.anthropic.com/v1/messages
/// 环境变量: ANTHROPIC_API_KEY
pub struct ClaudeProvider {
    client: &'static reqwest::Client,
}

impl Default for ClaudeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaudeProvider {
    pub fn new() -> Self {
        Self {
            client: shared_client(),
        }
    }
}

#[async_trait]
impl AIProvider for ClaudeProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn chat(&self, system: &str, messages: &[ChatMessage], config: &ProviderConfig) -> CriticResult<String> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| CriticError::config("ANTHROPIC_API_KEY environment variable not set."))?;

        let request = AnthropicRequest {
            model: &config.model,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            system,
            messages: messages
                .iter()
                .map(|m| AnthropicMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
        };

        tracing::debug!(model = %config.model, messages = messages.len(), "Sending Anthropic request");

        let response = self
            .client
            .post(&config.api_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .timeout(Duration::from_secs(config.timeout_secs))
            .send()
            .await
            .map_err(|e| request_error(PROVIDER_NAME, e))?;

        if !response.status().is_success() {
            return Err(status_error(PROVIDER_NAME, response).await);
        }

        let api_response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| CriticError::provider(PROVIDER_NAME, format!("invalid response body: {}", e), false))?;

        let content = api_response
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anthropic_request_serialization() {
        let request = AnthropicRequest {
            model: "claude-sonnet-4-5-20250929",
            max_tokens: 4096,
            temperature: 0.2,
            system: "You are a commit message analyzer",
            messages: vec![AnthropicMessage {
                role: "user",
                content: "Analyze these commits",
            }],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "claude-sonnet-4-5-20250929");
        assert_eq!(json["system"], "You are a commit message analyzer");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 4096);
    }

    #[test]
    fn test_anthropic_response_deserialization() {
        let json = r#"{"content": [{"type": "text", "text": "[{\"hash\":"}, {"type": "text", "text": "\"abc\"}]"}]}"#;
        let response: AnthropicResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.content.len(), 2);
        assert_eq!(response.content[0].text.as_deref(), Some("[{\"hash\":"));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_configuration_error() {
        let provider = ClaudeProvider::new();
        let err = provider
            .chat("system", &[ChatMessage::user("hi")], &ProviderConfig::default())
            .await
            .unwrap_err();
        assert!(err.is_fatal());
    }
}
