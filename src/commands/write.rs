use crate::ai::agents::AgentManager;
use crate::git::get_repo_info;
use crate::infrastructure::CriticResult;
use crate::models::{CommitResult, RepoInfoResult, StagedChanges, SuggestedCommit};
use crate::ui;
use crate::workflow::{
    ApprovalOutcome, ApprovalWorkflow, ApprovedMessage, CancelReason, CommitExecutor, Prompter, Reviser,
};
use async_trait::async_trait;
use std::path::Path;

/// 撰写流程的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    NoStagedChanges(String),
    Committed {
        message: String,
        result: CommitResult,
        revisions: usize,
    },
    Cancelled {
        reason: CancelReason,
        revisions: usize,
    },
    /// 读取暂存区失败
    Failed(String),
}

/// 把确认流程的修改和提交请求转交给子 agent
struct AgentBridge<'a> {
    manager: &'a AgentManager,
    thread_id: &'a str,
    changes: &'a StagedChanges,
    repo_path: &'a Path,
}

#[async_trait]
impl Reviser for AgentBridge<'_> {
    async fn revise(&self, current: &SuggestedCommit, feedback: &str) -> CriticResult<SuggestedCommit> {
        self.manager
            .suggest_commit_message(self.thread_id, self.changes, Some(current), Some(feedback))
            .await
    }
}

#[async_trait]
impl CommitExecutor for AgentBridge<'_> {
    async fn execute(&self, message: ApprovedMessage) -> CommitResult {
        self.manager
            .execute_commit(self.thread_id, message, self.repo_path)
            .await
            .unwrap_or_else(|e| CommitResult::failed(e.to_string()))
    }
}

/// 读取暂存区、生成建议并走确认流程
///
/// 没有暂存改动时不会调用模型，也不会提交。
pub async fn write_commit<P: Prompter>(
    manager: &AgentManager,
    thread_id: &str,
    repo_path: &Path,
    prompter: P,
) -> CriticResult<WriteOutcome> {
    let changes = manager.get_staged_changes(thread_id, repo_path).await?;
    if let Some(error) = changes.error {
        return Ok(WriteOutcome::Failed(error));
    }
    if !changes.has_staged {
        return Ok(WriteOutcome::NoStagedChanges(changes.message.unwrap_or_default()));
    }

    let suggestion = manager.suggest_commit_message(thread_id, &changes, None, None).await?;

    let bridge = AgentBridge {
        manager,
        thread_id,
        changes: &changes,
        repo_path,
    };
    let outcome = ApprovalWorkflow::new(prompter, &bridge, &bridge).run(suggestion).await;

    Ok(match outcome {
        ApprovalOutcome::Committed {
            message,
            result,
            revisions,
        } => WriteOutcome::Committed {
            message,
            result,
            revisions,
        },
        ApprovalOutcome::Cancelled { reason, revisions } => WriteOutcome::Cancelled { reason, revisions },
    })
}

/// `--write`
pub async fn run<P: Prompter>(manager: &AgentManager, thread_id: &str, repo_path: &Path, prompter: P) -> anyhow::Result<i32> {
    match get_repo_info(repo_path).await {
        RepoInfoResult::Ok(info) => println!("\n{}", ui::render_repo_info(&info)),
        RepoInfoResult::Err { error } => {
            eprintln!("❌ {}", error);
            return Ok(0);
        }
    }
    println!("检查暂存区...");

    let outcome = match write_commit(manager, thread_id, repo_path, prompter).await {
        Ok(outcome) => outcome,
        Err(e) => return Ok(super::report_failure(&e)),
    };

    match outcome {
        WriteOutcome::NoStagedChanges(message) => println!("{}", message),
        WriteOutcome::Committed { result, .. } => print!("\n{}", ui::render_commit_result(&result)),
        WriteOutcome::Cancelled { reason, .. } => println!("\n{}", reason),
        WriteOutcome::Failed(error) => eprintln!("❌ {}", error),
    }

    println!("\nThread ID: {}", thread_id);
    Ok(0)
}
