use thiserror::Error;

/// commit-critic 错误类型
///
/// 工具层（git 调用）的失败会被转换成结构化结果返回，不会冒泡到顶层；
/// 只有启动阶段的配置错误是致命的。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CriticError {
    #[error("git 调用失败: {tool} - {message}")]
    ToolInvocation { tool: String, message: String },

    #[error("验证错误: {message}")]
    Validation { message: String, field: Option<String> },

    #[error("超时错误: {operation} 超时 ({timeout_seconds}s)")]
    Timeout { operation: String, timeout_seconds: u64 },

    #[error("配置错误: {message}")]
    Configuration { message: String },

    #[error("模型输出格式错误: {agent} - {message}")]
    MalformedOutput { agent: String, message: String },

    #[error("AI 服务错误: {provider} - {message}")]
    Provider {
        provider: String,
        message: String,
        retryable: bool,
    },

    #[error("存储错误: {storage_type} - {message}")]
    Storage { message: String, storage_type: String },
}

impl CriticError {
    /// 检查错误是否可重试
    pub fn is_retryable(&self) -> bool {
        match self {
            CriticError::Provider { retryable, .. } => *retryable,
            CriticError::MalformedOutput { .. } => true,
            _ => false,
        }
    }

    /// 是否为启动阶段的致命错误
    pub fn is_fatal(&self) -> bool {
        matches!(self, CriticError::Configuration { .. })
    }

    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        CriticError::ToolInvocation {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>, field: Option<&str>) -> Self {
        CriticError::Validation {
            message: message.into(),
            field: field.map(str::to_string),
        }
    }

    pub fn timeout(operation: impl Into<String>, timeout_seconds: u64) -> Self {
        CriticError::Timeout {
            operation: operation.into(),
            timeout_seconds,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        CriticError::Configuration {
            message: message.into(),
        }
    }

    pub fn malformed(agent: impl Into<String>, message: impl Into<String>) -> Self {
        CriticError::MalformedOutput {
            agent: agent.into(),
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>, retryable: bool) -> Self {
        CriticError::Provider {
            provider: provider.into(),
            message: message.into(),
            retryable,
        }
    }

    pub fn storage(storage_type: impl Into<String>, message: impl Into<String>) -> Self {
        CriticError::Storage {
            message: message.into(),
            storage_type: storage_type.into(),
        }
    }
}

pub type CriticResult<T> = Result<T, CriticError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(CriticError::provider("anthropic", "529 overloaded", true).is_retryable());
        assert!(!CriticError::provider("anthropic", "401", false).is_retryable());
        assert!(CriticError::malformed("analyze_commits", "not json").is_retryable());
        assert!(!CriticError::validation("Empty URL provided", Some("url")).is_retryable());
        assert!(!CriticError::timeout("git clone", 60).is_retryable());
    }

    #[test]
    fn test_only_configuration_is_fatal() {
        assert!(CriticError::config("ANTHROPIC_API_KEY not set").is_fatal());
        assert!(!CriticError::tool("git log", "not a git repository").is_fatal());
        assert!(!CriticError::storage("sqlite", "locked").is_fatal());
    }

    #[test]
    fn test_error_display() {
        let err = CriticError::timeout("git clone", 60);
        assert_eq!(err.to_string(), "超时错误: git clone 超时 (60s)");

        let err = CriticError::validation("Empty commit message provided", Some("message"));
        assert!(err.to_string().contains("Empty commit message provided"));
    }
}
