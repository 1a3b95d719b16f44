//! 模型相关：provider、提示词、输出校验、评分细则和子 agent

pub mod agents;
pub mod http;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod scoring;
pub mod validation;

pub use agents::{AgentContext, AgentManager, AgentOutput, AgentTask, CommitSource};
pub use provider::{AIProvider, ChatMessage, ChatRole, ProviderConfig, ProviderFactory};
