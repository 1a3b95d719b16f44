use super::core::run_git;
use crate::models::repo::MAX_LIMIT;
use crate::models::{Commit, CommitList};
use std::path::Path;

const FIELD_SEPARATOR: char = '\x1f';
const RECORD_SEPARATOR: char = '\0';
const SHORT_HASH_LEN: usize = 8;

/// 把 limit 限制在 1..=500
pub fn clamp_limit(limit: i64) -> usize {
    limit.clamp(1, MAX_LIMIT) as usize
}

/// 获取最近的提交，最新的在前
///
/// 失败时返回带 `error` 的空列表。
pub async fn fetch_commits(repo_path: &Path, limit: i64) -> CommitList {
    let limit = clamp_limit(limit);
    let count = format!("-n{}", limit);

    match run_git(repo_path, &["log", &count, "--format=%H%x1f%s%x1f%b%x00"]).await {
        Ok(output) if output.success() => {
            let commits = parse_log_output(&output.stdout);
            tracing::debug!("Fetched {} commits from {}", commits.len(), repo_path.display());
            CommitList::ok(commits)
        }
        Ok(output) => CommitList::failed(format!("Failed to fetch commits: {}", output.error_text())),
        Err(e) => CommitList::failed(format!("Failed to fetch commits: {}", e)),
    }
}

/// 解析 `%H%x1f%s%x1f%b%x00` 格式的 log 输出
pub fn parse_log_output(stdout: &str) -> Vec<Commit> {
    stdout
        .split(RECORD_SEPARATOR)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let mut parts = entry.splitn(3, FIELD_SEPARATOR);
            let hash = parts.next()?;
            let message = parts.next()?;
            let body = parts.next().unwrap_or("");
            Some(Commit::new(
                hash.chars().take(SHORT_HASH_LEN).collect::<String>(),
                message.trim(),
                body.trim(),
            ))
        })
        .collect()
}
