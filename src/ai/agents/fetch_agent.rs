use super::{Agent, AgentContext, AgentOutput, AgentTask, CommitSource, FETCH_COMMITS};
use crate::git::{clone_repo, fetch_commits};
use crate::infrastructure::CriticResult;
use crate::models::CommitList;
use async_trait::async_trait;
use tracing::info;

/// 读取提交历史，远程仓库先浅克隆
pub struct FetchAgent;

impl FetchAgent {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FetchAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for FetchAgent {
    fn name(&self) -> &str {
        FETCH_COMMITS
    }

    fn description(&self) -> &str {
        "Fetch commit history from a local repository or a remote URL"
    }

    async fn execute(&self, task: AgentTask, _context: &AgentContext) -> CriticResult<AgentOutput> {
        self.validate_task(&task)?;
        let AgentTask::FetchCommits { source, limit } = task else {
            return Err(super::unexpected_task(self.name()));
        };

        match source {
            CommitSource::Local(path) => Ok(AgentOutput::Commits {
                list: fetch_commits(&path, limit).await,
                clone: None,
            }),
            CommitSource::Remote(url) => {
                let cloned = clone_repo(&url).await;
                let list = match (&cloned.repo_path, cloned.success) {
                    (Some(path), true) => {
                        info!("Fetching commits from clone at {}", path.display());
                        fetch_commits(path, limit).await
                    }
                    _ => CommitList::failed(cloned.error.clone().unwrap_or_else(|| "Clone failed".to_string())),
                };
                Ok(AgentOutput::Commits {
                    list,
                    clone: Some(cloned),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CloneFailureReason;

    #[tokio::test]
    async fn test_invalid_remote_url_fails_without_clone() {
        let task = AgentTask::FetchCommits {
            source: CommitSource::Remote("ftp://example.com/x".into()),
            limit: 10,
        };
        let output = FetchAgent::new().execute(task, &AgentContext::offline()).await.unwrap();
        let AgentOutput::Commits { list, clone } = output else {
            panic!("unexpected output");
        };
        assert!(list.commits.is_empty());
        assert!(list.error.unwrap().contains("Invalid URL protocol"));
        assert_eq!(clone.unwrap().reason, Some(CloneFailureReason::InvalidUrl));
    }

    #[tokio::test]
    async fn test_rejects_foreign_task() {
        let result = FetchAgent::new()
            .execute(AgentTask::AnalyzeCommits(vec![]), &AgentContext::offline())
            .await;
        assert!(result.is_err());
    }
}
