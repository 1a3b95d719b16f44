use super::{Agent, AgentContext, AgentOutput, AgentTask, GET_STAGED_CHANGES};
use crate::git::get_staged_diff;
use crate::infrastructure::CriticResult;
use async_trait::async_trait;

/// 读取暂存区
pub struct StagedAgent;

impl StagedAgent {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StagedAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for StagedAgent {
    fn name(&self) -> &str {
        GET_STAGED_CHANGES
    }

    fn description(&self) -> &str {
        "Read the staged diff, stat and file list"
    }

    async fn execute(&self, task: AgentTask, _context: &AgentContext) -> CriticResult<AgentOutput> {
        self.validate_task(&task)?;
        let AgentTask::GetStagedChanges { repo_path } = task else {
            return Err(super::unexpected_task(self.name()));
        };
        Ok(AgentOutput::StagedChanges(get_staged_diff(&repo_path).await))
    }
}
