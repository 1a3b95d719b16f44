use super::{ask_structured, Agent, AgentContext, AgentOutput, AgentTask, SUGGEST_COMMIT_MESSAGE};
use crate::ai::prompt::{build_suggest_input, suggest_system_prompt};
use crate::ai::validation::parse_suggestion;
use crate::infrastructure::{CriticError, CriticResult};
use async_trait::async_trait;

/// 根据暂存区生成 conventional commit
pub struct SuggestAgent;

impl SuggestAgent {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SuggestAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for SuggestAgent {
    fn name(&self) -> &str {
        SUGGEST_COMMIT_MESSAGE
    }

    fn description(&self) -> &str {
        "Write a conventional commit message for the staged changes"
    }

    fn uses_model(&self) -> bool {
        true
    }

    async fn execute(&self, task: AgentTask, context: &AgentContext) -> CriticResult<AgentOutput> {
        self.validate_task(&task)?;
        let AgentTask::SuggestCommitMessage {
            changes,
            previous,
            feedback,
        } = task
        else {
            return Err(super::unexpected_task(self.name()));
        };

        if !changes.has_staged {
            return Err(CriticError::validation("no staged changes to describe", Some("changes")));
        }

        let provider = context.require_provider(self.name())?;
        let input = build_suggest_input(&changes, previous.as_ref(), feedback.as_deref());
        let suggestion = ask_structured(
            provider.as_ref(),
            &context.provider_config,
            &context.history,
            &suggest_system_prompt(),
            input,
            context.max_retries,
            parse_suggestion,
        )
        .await?;
        Ok(AgentOutput::Suggestion(suggestion))
    }
}
