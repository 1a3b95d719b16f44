use super::{ask_structured, Agent, AgentContext, AgentOutput, AgentTask, ANALYZE_COMMITS};
use crate::ai::prompt::{analyze_system_prompt, build_analyze_input};
use crate::ai::scoring::offline_analysis;
use crate::ai::validation::parse_analyses;
use crate::infrastructure::CriticResult;
use crate::models::{Commit, CommitAnalysis};
use async_trait::async_trait;
use tracing::{debug, info};

/// 每次请求提交给模型的提交数
pub const BATCH_SIZE: usize = 25;

/// 提交信息评分
///
/// 有 provider 时按批请求模型，否则用本地启发式评分。
pub struct AnalyzeAgent;

impl AnalyzeAgent {
    pub fn new() -> Self {
        Self
    }

    async fn analyze_with_model(&self, commits: &[Commit], context: &AgentContext) -> CriticResult<Vec<CommitAnalysis>> {
        let provider = context.require_provider(ANALYZE_COMMITS)?;
        let system = analyze_system_prompt();
        let mut analyses = Vec::with_capacity(commits.len());

        for (index, batch) in commits.chunks(BATCH_SIZE).enumerate() {
            debug!("Analyzing batch {} ({} commits)", index + 1, batch.len());
            let parsed = ask_structured(
                provider.as_ref(),
                &context.provider_config,
                &context.history,
                &system,
                build_analyze_input(batch),
                context.max_retries,
                |response: &str| parse_analyses(response, batch),
            )
            .await?;
            analyses.extend(parsed);
        }
        Ok(analyses)
    }
}

impl Default for AnalyzeAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for AnalyzeAgent {
    fn name(&self) -> &str {
        ANALYZE_COMMITS
    }

    fn description(&self) -> &str {
        "Score commit messages 1-10 and explain the score"
    }

    fn uses_model(&self) -> bool {
        true
    }

    async fn execute(&self, task: AgentTask, context: &AgentContext) -> CriticResult<AgentOutput> {
        self.validate_task(&task)?;
        let AgentTask::AnalyzeCommits(commits) = task else {
            return Err(super::unexpected_task(self.name()));
        };

        let analyses = if context.provider.is_some() {
            self.analyze_with_model(&commits, context).await?
        } else {
            info!("No AI provider configured, scoring {} commits offline", commits.len());
            commits.iter().map(offline_analysis).collect::<CriticResult<Vec<_>>>()?
        };
        Ok(AgentOutput::Analyses { analyses })
    }
}
