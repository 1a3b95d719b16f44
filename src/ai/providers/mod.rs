pub mod claude;
pub mod openai;

pub use claude::ClaudeProvider;
pub use openai::OpenAIProvider;

use crate::ai::http::is_retryable_status;
use crate::infrastructure::CriticError;

/// 网络层错误：超时和连接失败可重试
pub(crate) fn request_error(provider: &str, err: reqwest::Error) -> CriticError {
    let retryable = err.is_timeout() || err.is_connect();
    CriticError::provider(provider, format!("request failed: {}", err), retryable)
}

/// 非 2xx 响应
pub(crate) async fn status_error(provider: &str, response: reqwest::Response) -> CriticError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    CriticError::provider(
        provider,
        format!("request failed: {} - {}", status, text),
        is_retryable_status(status),
    )
}
