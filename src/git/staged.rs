use super::core::git_stdout;
use crate::infrastructure::CriticResult;
use crate::models::repo::MAX_DIFF_CHARS;
use crate::models::StagedChanges;
use std::path::Path;

/// 截断到前 `max_chars` 个字符，不会切断多字节字符
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// 读取暂存区改动
pub async fn get_staged_diff(repo_path: &Path) -> StagedChanges {
    match staged_diff(repo_path).await {
        Ok(changes) => changes,
        Err(e) => StagedChanges::failed(format!("Failed to get staged changes: {}", e)),
    }
}

async fn staged_diff(repo_path: &Path) -> CriticResult<StagedChanges> {
    let stat = git_stdout(repo_path, &["diff", "--staged", "--stat"]).await?;
    let diff = git_stdout(repo_path, &["diff", "--staged"]).await?;
    let names = git_stdout(repo_path, &["diff", "--staged", "--name-only"]).await?;

    let files: Vec<String> = names
        .lines()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect();

    if files.is_empty() {
        return Ok(StagedChanges::nothing_staged());
    }

    let total_chars = diff.chars().count();
    if total_chars > MAX_DIFF_CHARS {
        tracing::debug!("Staged diff truncated from {} to {} chars", total_chars, MAX_DIFF_CHARS);
    }

    Ok(StagedChanges::staged(
        stat,
        truncate_chars(&diff, MAX_DIFF_CHARS).to_string(),
        files,
    ))
}
