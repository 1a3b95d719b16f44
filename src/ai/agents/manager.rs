use super::*;
use crate::ai::provider::ChatMessage;
use crate::storage::{ThreadStore, Turn, TurnRole};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// 续接线程时带入的历史消息上限
pub const MAX_HISTORY_MESSAGES: usize = 20;

/// Agent 管理器：按名字注册子 agent，并把每次委派记录到线程
pub struct AgentManager {
    agents: HashMap<String, Arc<dyn Agent>>,
    context: AgentContext,
    store: Arc<dyn ThreadStore>,
}

impl AgentManager {
    /// 创建空的管理器
    pub fn new(context: AgentContext, store: Arc<dyn ThreadStore>) -> Self {
        Self {
            agents: HashMap::new(),
            context,
            store,
        }
    }

    /// 注册全部五个子 agent
    pub fn with_default_agents(context: AgentContext, store: Arc<dyn ThreadStore>) -> Self {
        let mut manager = Self::new(context, store);
        manager.register(Arc::new(FetchAgent::new()));
        manager.register(Arc::new(AnalyzeAgent::new()));
        manager.register(Arc::new(StagedAgent::new()));
        manager.register(Arc::new(SuggestAgent::new()));
        manager.register(Arc::new(ExecuteAgent::new()));
        manager
    }

    pub fn register(&mut self, agent: Arc<dyn Agent>) {
        let name = agent.name().to_string();
        debug!("Registered agent: {}", name);
        self.agents.insert(name, agent);
    }

    pub fn get_agent(&self, name: &str) -> Option<Arc<dyn Agent>> {
        self.agents.get(name).cloned()
    }

    /// 已注册的 agent 名称，按字母排序
    pub fn list_agents(&self) -> Vec<String> {
        let mut names: Vec<String> = self.agents.keys().cloned().collect();
        names.sort();
        names
    }

    /// 记录失败只告警，不影响主流程
    async fn record(&self, thread_id: &str, role: TurnRole, agent: &str, content: &str) {
        if let Err(e) = self.store.append(thread_id, role, Some(agent), content).await {
            warn!("Failed to record {} turn for {}: {}", role, thread_id, e);
        }
    }

    /// 线程中之前的模型对话；读取失败时按空线程处理
    async fn conversation(&self, thread_id: &str) -> Vec<ChatMessage> {
        match self.store.history(thread_id).await {
            Ok(turns) => conversation_from(&turns),
            Err(e) => {
                warn!("Failed to load history for {}: {}", thread_id, e);
                Vec::new()
            }
        }
    }

    /// 把任务交给对应的 agent 并等待结果
    pub async fn delegate(&self, thread_id: &str, task: AgentTask) -> CriticResult<AgentOutput> {
        let name = task.agent_name();
        let agent = self
            .get_agent(name)
            .ok_or_else(|| CriticError::tool(name, format!("Agent not found: {}", name)))?;

        info!("Delegating to {}", name);
        let continued;
        let context = if agent.uses_model() {
            let history = self.conversation(thread_id).await;
            debug!("Continuing {} with {} earlier messages", thread_id, history.len());
            continued = self.context.with_history(history);
            &continued
        } else {
            &self.context
        };
        self.record(thread_id, TurnRole::User, name, &task.describe()).await;

        let role = if agent.uses_model() {
            TurnRole::Assistant
        } else {
            TurnRole::Tool
        };
        match agent.execute(task, context).await {
            Ok(output) => {
                self.record(thread_id, role, name, &output.to_json()).await;
                Ok(output)
            }
            Err(e) => {
                let content = serde_json::json!({ "error": e.to_string() }).to_string();
                self.record(thread_id, role, name, &content).await;
                Err(e)
            }
        }
    }

    /// 读取提交历史；远程仓库同时返回克隆结果
    pub async fn fetch_commits(
        &self,
        thread_id: &str,
        source: CommitSource,
        limit: i64,
    ) -> CriticResult<(CommitList, Option<CloneResult>)> {
        match self.delegate(thread_id, AgentTask::FetchCommits { source, limit }).await? {
            AgentOutput::Commits { list, clone } => Ok((list, clone)),
            other => Err(unexpected_output(FETCH_COMMITS, &other)),
        }
    }

    pub async fn analyze_commits(&self, thread_id: &str, commits: Vec<Commit>) -> CriticResult<Vec<CommitAnalysis>> {
        match self.delegate(thread_id, AgentTask::AnalyzeCommits(commits)).await? {
            AgentOutput::Analyses { analyses } => Ok(analyses),
            other => Err(unexpected_output(ANALYZE_COMMITS, &other)),
        }
    }

    pub async fn get_staged_changes(&self, thread_id: &str, repo_path: &Path) -> CriticResult<StagedChanges> {
        let task = AgentTask::GetStagedChanges {
            repo_path: repo_path.to_path_buf(),
        };
        match self.delegate(thread_id, task).await? {
            AgentOutput::StagedChanges(changes) => Ok(changes),
            other => Err(unexpected_output(GET_STAGED_CHANGES, &other)),
        }
    }

    /// 生成建议；`previous` 和 `feedback` 都给出时为修改
    pub async fn suggest_commit_message(
        &self,
        thread_id: &str,
        changes: &StagedChanges,
        previous: Option<&SuggestedCommit>,
        feedback: Option<&str>,
    ) -> CriticResult<SuggestedCommit> {
        let task = AgentTask::SuggestCommitMessage {
            changes: changes.clone(),
            previous: previous.cloned(),
            feedback: feedback.map(str::to_string),
        };
        match self.delegate(thread_id, task).await? {
            AgentOutput::Suggestion(suggestion) => Ok(suggestion),
            other => Err(unexpected_output(SUGGEST_COMMIT_MESSAGE, &other)),
        }
    }

    pub async fn execute_commit(
        &self,
        thread_id: &str,
        message: ApprovedMessage,
        repo_path: &Path,
    ) -> CriticResult<CommitResult> {
        let task = AgentTask::ExecuteCommit {
            message,
            repo_path: repo_path.to_path_buf(),
        };
        match self.delegate(thread_id, task).await? {
            AgentOutput::CommitResult(result) => Ok(result),
            other => Err(unexpected_output(EXECUTE_COMMIT, &other)),
        }
    }
}

/// 取出线程中的模型问答对：user 指令紧跟同一 agent 的 assistant 回复
///
/// git 类 agent 的 tool 记录不进入对话，保留最近的 `MAX_HISTORY_MESSAGES` 条。
fn conversation_from(turns: &[Turn]) -> Vec<ChatMessage> {
    let mut messages: Vec<ChatMessage> = turns
        .windows(2)
        .filter(|pair| {
            pair[0].role == TurnRole::User && pair[1].role == TurnRole::Assistant && pair[0].agent == pair[1].agent
        })
        .flat_map(|pair| [ChatMessage::user(&pair[0].content), ChatMessage::assistant(&pair[1].content)])
        .collect();
    if messages.len() > MAX_HISTORY_MESSAGES {
        messages = messages.split_off(messages.len() - MAX_HISTORY_MESSAGES);
    }
    messages
}

fn unexpected_output(agent: &str, output: &AgentOutput) -> CriticError {
    CriticError::tool(agent, format!("unexpected output: {}", output.to_json()))
}
