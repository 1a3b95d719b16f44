use crate::infrastructure::{CriticError, CriticResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const THREAD_PREFIX: &str = "thread_";
const THREAD_HEX_LEN: usize = 12;

/// 会话中的发言方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// 主流程下发给子 agent 的指令
    User,
    /// 模型或子 agent 的回复
    Assistant,
    /// git 工具的结构化结果
    Tool,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
            TurnRole::Tool => "tool",
        }
    }
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TurnRole {
    type Err = CriticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(TurnRole::User),
            "assistant" => Ok(TurnRole::Assistant),
            "tool" => Ok(TurnRole::Tool),
            other => Err(CriticError::storage("thread", format!("unknown turn role: {}", other))),
        }
    }
}

/// 线程中的一条记录，只追加不修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub thread_id: String,
    /// 线程内从 1 开始递增
    pub seq: i64,
    pub role: TurnRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// `--threads` 列表项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub thread_id: String,
    pub turn_count: usize,
    pub updated_at: DateTime<Utc>,
}

/// 生成 `thread_<12 位 hex>` 形式的线程 ID
pub fn generate_thread_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("{}{}", THREAD_PREFIX, &hex[..THREAD_HEX_LEN])
}

/// 给定 ID 原样返回（去掉首尾空白），否则生成新的
pub fn get_or_create_thread_id(thread_id: Option<&str>) -> String {
    match thread_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => id.to_string(),
        None => generate_thread_id(),
    }
}

pub fn validate_thread_id(thread_id: &str) -> CriticResult<()> {
    if thread_id.trim().is_empty() {
        return Err(CriticError::validation("thread id must not be empty", Some("thread")));
    }
    Ok(())
}
