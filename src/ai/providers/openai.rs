use super::{request_error, status_error};
use crate::ai::http::shared_client;
use crate::ai::provider::{AIProvider, ChatMessage, ProviderConfig};
use crate::infrastructure::{CriticError, CriticResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PROVIDER_NAME: &str = "openai";

/// OpenAI Chat Completion 请求
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<RequestMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// OpenAI Chat Completion 响应
#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatMessageResponse>,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

/// OpenAI 提供商
///
/// 默认 URL: https://api.openai.com/v1/chat/completions
/// 默认 model: gpt-4o-mini
/// 环境变量: OPENAI_API_KEY
pub struct OpenAIProvider {
    client: &'static reqwest::Client,
}

impl Default for OpenAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenAIProvider {
    pub fn new() -> Self {
        Self {
            client: shared_client(),
        }
    }
}

#[async_trait]
impl AIProvider for OpenAIProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn chat(&self, system: &str, messages: &[ChatMessage], config: &ProviderConfig) -> CriticResult<String> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| CriticError::config("OPENAI_API_KEY environment variable not set."))?;

        // system 提示词作为第一条消息
        let mut request_messages = Vec::with_capacity(messages.len() + 1);
        request_messages.push(RequestMessage {
            role: "system",
            content: system,
        });
        request_messages.extend(messages.iter().map(|m| RequestMessage {
            role: m.role.as_str(),
            content: &m.content,
        }));

        let request = ChatCompletionRequest {
            model: &config.model,
            messages: request_messages,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        };

        tracing::debug!(model = %config.model, messages = messages.len(), "Sending OpenAI request");

        let response = self
            .client
            .post(&config.api_url)
            .bearer_auth(api_key)
            .json(&request)
            .timeout(Duration::from_secs(config.timeout_secs))
            .send()
            .await
            .map_err(|e| request_error(PROVIDER_NAME, e))?;

        if !response.status().is_success() {
            return Err(status_error(PROVIDER_NAME, response).await);
        }

        let chat_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CriticError::provider(PROVIDER_NAME, format!("invalid response body: {}", e), false))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or_else(|| CriticError::provider(PROVIDER_NAME, "response contained no choices", true))
    }
}
