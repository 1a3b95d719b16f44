//! 子 agent
//!
//! 主流程把一个原子任务交给对应名字的 agent，等待结构化结果。
//! git 类 agent 只包装 `crate::git`，模型类 agent 负责调用 provider 并校验输出。

use crate::ai::prompt::correction_message;
use crate::ai::provider::{AIProvider, ChatMessage, ProviderConfig};
use crate::infrastructure::{CriticError, CriticResult};
use crate::models::{CloneResult, Commit, CommitAnalysis, CommitList, CommitResult, StagedChanges, SuggestedCommit};
use crate::workflow::ApprovedMessage;
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

pub mod analyze_agent;
pub mod execute_agent;
pub mod fetch_agent;
pub mod manager;
pub mod staged_agent;
pub mod suggest_agent;

pub use analyze_agent::AnalyzeAgent;
pub use execute_agent::ExecuteAgent;
pub use fetch_agent::FetchAgent;
pub use manager::AgentManager;
pub use staged_agent::StagedAgent;
pub use suggest_agent::SuggestAgent;

pub const FETCH_COMMITS: &str = "fetch_commits";
pub const ANALYZE_COMMITS: &str = crate::ai::validation::ANALYZE_AGENT;
pub const GET_STAGED_CHANGES: &str = "get_staged_changes";
pub const SUGGEST_COMMIT_MESSAGE: &str = crate::ai::validation::SUGGEST_AGENT;
pub const EXECUTE_COMMIT: &str = "execute_commit";

/// Agent 执行上下文
#[derive(Clone)]
pub struct AgentContext {
    /// 没有 provider 时模型类任务走离线路径或报错
    pub provider: Option<Arc<dyn AIProvider>>,
    pub provider_config: ProviderConfig,
    /// 模型输出不合规时的重试次数
    pub max_retries: u32,
    /// 同一线程中之前的模型对话，放在本次输入之前
    pub history: Vec<ChatMessage>,
}

impl AgentContext {
    pub fn new(provider: Option<Arc<dyn AIProvider>>, provider_config: ProviderConfig, max_retries: u32) -> Self {
        Self {
            provider,
            provider_config,
            max_retries,
            history: Vec::new(),
        }
    }

    /// 带上线程历史的副本
    pub fn with_history(&self, history: Vec<ChatMessage>) -> Self {
        Self {
            history,
            ..self.clone()
        }
    }

    /// 离线上下文，不调用任何模型
    pub fn offline() -> Self {
        Self::new(None, ProviderConfig::default(), 0)
    }

    pub fn require_provider(&self, agent: &str) -> CriticResult<&Arc<dyn AIProvider>> {
        self.provider
            .as_ref()
            .ok_or_else(|| CriticError::config(format!("{} needs an AI provider", agent)))
    }
}

/// 提交来源
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitSource {
    Local(PathBuf),
    Remote(String),
}

/// Agent 任务
#[derive(Debug, Clone)]
pub enum AgentTask {
    FetchCommits {
        source: CommitSource,
        limit: i64,
    },
    AnalyzeCommits(Vec<Commit>),
    GetStagedChanges {
        repo_path: PathBuf,
    },
    SuggestCommitMessage {
        changes: StagedChanges,
        previous: Option<SuggestedCommit>,
        feedback: Option<String>,
    },
    ExecuteCommit {
        message: ApprovedMessage,
        repo_path: PathBuf,
    },
}

impl AgentTask {
    /// 负责该任务的 agent
    pub fn agent_name(&self) -> &'static str {
        match self {
            AgentTask::FetchCommits { .. } => FETCH_COMMITS,
            AgentTask::AnalyzeCommits(_) => ANALYZE_COMMITS,
            AgentTask::GetStagedChanges { .. } => GET_STAGED_CHANGES,
            AgentTask::SuggestCommitMessage { .. } => SUGGEST_COMMIT_MESSAGE,
            AgentTask::ExecuteCommit { .. } => EXECUTE_COMMIT,
        }
    }

    /// 写入线程的指令文本
    pub fn describe(&self) -> String {
        match self {
            AgentTask::FetchCommits {
                source: CommitSource::Local(path),
                limit,
            } => format!("Fetch the last {} commits from {}", limit, path.display()),
            AgentTask::FetchCommits {
                source: CommitSource::Remote(url),
                limit,
            } => format!("Clone {} and fetch the last {} commits", url, limit),
            AgentTask::AnalyzeCommits(commits) => format!("Analyze {} commit messages", commits.len()),
            AgentTask::GetStagedChanges { repo_path } => {
                format!("Get staged changes in {}", repo_path.display())
            }
            AgentTask::SuggestCommitMessage {
                feedback: Some(feedback),
                ..
            } => format!("Revise the commit message: {}", feedback),
            AgentTask::SuggestCommitMessage { .. } => "Suggest a commit message for the staged changes".to_string(),
            AgentTask::ExecuteCommit { message, repo_path } => {
                format!("Commit in {} with message: {}", repo_path.display(), message)
            }
        }
    }
}

/// Agent 执行结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentOutput {
    Commits {
        #[serde(flatten)]
        list: CommitList,
        #[serde(skip_serializing_if = "Option::is_none")]
        clone: Option<CloneResult>,
    },
    Analyses {
        analyses: Vec<CommitAnalysis>,
    },
    StagedChanges(StagedChanges),
    Suggestion(SuggestedCommit),
    CommitResult(CommitResult),
}

impl AgentOutput {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }
}

/// Agent 基础 trait
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// 模型类 agent 的回复写为 assistant，其余为 tool
    fn uses_model(&self) -> bool {
        false
    }

    /// 检查任务是否属于本 agent
    fn validate_task(&self, task: &AgentTask) -> CriticResult<()> {
        if task.agent_name() != self.name() {
            return Err(CriticError::validation(
                format!("{} cannot handle a {} task", self.name(), task.agent_name()),
                Some("task"),
            ));
        }
        Ok(())
    }

    async fn execute(&self, task: AgentTask, context: &AgentContext) -> CriticResult<AgentOutput>;
}

pub(crate) fn unexpected_task(agent: &str) -> CriticError {
    CriticError::validation(format!("unexpected task for {}", agent), Some("task"))
}

/// 调用模型并解析结构化输出
///
/// `history` 为线程中之前的对话。解析失败时把模型回复和纠正消息追加到对话中重试，
/// 最多 `max_retries` 次；provider 错误直接返回。
pub async fn ask_structured<T, F>(
    provider: &dyn AIProvider,
    config: &ProviderConfig,
    history: &[ChatMessage],
    system: &str,
    input: String,
    max_retries: u32,
    parse: F,
) -> CriticResult<T>
where
    F: Fn(&str) -> CriticResult<T> + Send + Sync,
{
    let mut messages = history.to_vec();
    messages.push(ChatMessage::user(input));
    let mut attempt = 0;

    loop {
        let response = provider.chat(system, &messages, config).await?;
        match parse(&response) {
            Ok(parsed) => return Ok(parsed),
            Err(e @ CriticError::MalformedOutput { .. }) if attempt < max_retries => {
                attempt += 1;
                tracing::warn!("Malformed model output (attempt {}/{}): {}", attempt, max_retries, e);
                messages.push(ChatMessage::assistant(response));
                messages.push(ChatMessage::user(correction_message(&e.to_string())));
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// 按顺序返回预设回复，并记录收到的对话
    pub struct ScriptedProvider {
        replies: Mutex<VecDeque<CriticResult<String>>>,
        pub calls: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedProvider {
        pub fn new<I, S>(replies: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(error: CriticError) -> Self {
            Self {
                replies: Mutex::new(VecDeque::from([Err(error)])),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl AIProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn chat(&self, _system: &str, messages: &[ChatMessage], _config: &ProviderConfig) -> CriticResult<String> {
            self.calls.lock().unwrap().push(messages.to_vec());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(CriticError::provider("scripted", "no more replies", false)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedProvider;
    use super::*;
    use crate::ai::validation::parse_suggestion;

    #[tokio::test]
    async fn test_ask_structured_retries_with_correction() {
        let provider = ScriptedProvider::new([
            "Sure! Here is the message: fix the thing",
            r#"{"type": "fix", "scope": null, "subject": "handle empty input", "body": null}"#,
        ]);
        let suggestion = ask_structured(
            &provider,
            &ProviderConfig::default(),
            &[],
            "system",
            "input".to_string(),
            2,
            parse_suggestion,
        )
        .await
        .unwrap();

        assert_eq!(suggestion.full_message(), "fix: handle empty input");
        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        // 第二次请求带上了上一轮回复和纠正消息
        assert_eq!(calls[1].len(), 3);
        assert!(calls[1][2].content.contains("could not be used"));
    }

    #[tokio::test]
    async fn test_ask_structured_gives_up_after_retries() {
        let provider = ScriptedProvider::new(["nope", "still nope"]);
        let err = ask_structured(
            &provider,
            &ProviderConfig::default(),
            &[],
            "system",
            "input".to_string(),
            1,
            parse_suggestion,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CriticError::MalformedOutput { .. }));
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_ask_structured_does_not_retry_provider_errors() {
        let provider = ScriptedProvider::failing(CriticError::provider("scripted", "401 Unauthorized", false));
        let err = ask_structured(
            &provider,
            &ProviderConfig::default(),
            &[],
            "system",
            "input".to_string(),
            3,
            parse_suggestion,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CriticError::Provider { .. }));
        assert_eq!(provider.call_count(), 1);
    }

    #[test]
    fn test_task_routing() {
        let task = AgentTask::FetchCommits {
            source: CommitSource::Remote("https://github.com/a/b".into()),
            limit: 10,
        };
        assert_eq!(task.agent_name(), "fetch_commits");
        assert!(task.describe().starts_with("Clone https://github.com/a/b"));
        assert_eq!(AgentTask::AnalyzeCommits(vec![]).agent_name(), "analyze_commits");
    }
}
