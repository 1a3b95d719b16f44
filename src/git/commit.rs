use super::core::run_git;
use crate::models::CommitResult;
use std::path::Path;

/// 执行一次 `git commit -m <message>`
///
/// 空白信息在本地拒绝，不启动 git。只应在用户确认后调用。
pub async fn create_commit(message: &str, repo_path: &Path) -> CommitResult {
    if message.trim().is_empty() {
        return CommitResult::failed("Empty commit message provided");
    }

    match run_git(repo_path, &["commit", "-m", message]).await {
        Ok(output) if output.success() => {
            tracing::info!("Committed in {}", repo_path.display());
            CommitResult::committed(message, output.stdout)
        }
        Ok(output) => {
            // git commit 的失败原因有时只写到 stdout（比如没有暂存内容）
            let reason = if output.stderr.trim().is_empty() {
                output.stdout.trim().to_string()
            } else {
                output.error_text()
            };
            CommitResult::failed(format!("Commit failed: {}", reason))
        }
        Err(e) => CommitResult::failed(format!("Commit failed: {}", e)),
    }
}
