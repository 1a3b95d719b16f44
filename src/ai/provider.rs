use crate::infrastructure::{CriticError, CriticResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// AI 提供商配置
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub api_url: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: String::from(crate::config::DEFAULT_ANTHROPIC_MODEL),
            api_key: None,
            api_url: String::from(crate::config::ANTHROPIC_API_URL),
            timeout_secs: 120,
            max_tokens: 4096,
            temperature: 0.2,
        }
    }
}

/// 对话角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// 一条对话消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// AI 提供商接口
///
/// 系统提示词单独传入，`messages` 按时间顺序排列，最后一条是 user。
#[async_trait]
pub trait AIProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn chat(&self, system: &str, messages: &[ChatMessage], config: &ProviderConfig) -> CriticResult<String>;
}

/// AI 提供商工厂
pub struct ProviderFactory;

impl ProviderFactory {
    /// 根据名称创建提供商
    pub fn create(name: &str) -> CriticResult<Arc<dyn AIProvider>> {
        use crate::ai::providers::{ClaudeProvider, OpenAIProvider};

        match name.to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Arc::new(ClaudeProvider::new())),
            "openai" => Ok(Arc::new(OpenAIProvider::new())),
            _ => Err(CriticError::config(format!("Unknown AI provider: {}", name))),
        }
    }
}
