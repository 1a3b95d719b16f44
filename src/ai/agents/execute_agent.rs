use super::{Agent, AgentContext, AgentOutput, AgentTask, EXECUTE_COMMIT};
use crate::git::create_commit;
use crate::infrastructure::CriticResult;
use async_trait::async_trait;

/// 执行已确认的提交
///
/// 任务只接受 `ApprovedMessage`，未经确认流程的文本无法到达这里。
pub struct ExecuteAgent;

impl ExecuteAgent {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExecuteAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for ExecuteAgent {
    fn name(&self) -> &str {
        EXECUTE_COMMIT
    }

    fn description(&self) -> &str {
        "Run git commit with an approved message"
    }

    async fn execute(&self, task: AgentTask, _context: &AgentContext) -> CriticResult<AgentOutput> {
        self.validate_task(&task)?;
        let AgentTask::ExecuteCommit { message, repo_path } = task else {
            return Err(super::unexpected_task(self.name()));
        };
        Ok(AgentOutput::CommitResult(
            create_commit(message.as_str(), &repo_path).await,
        ))
    }
}
