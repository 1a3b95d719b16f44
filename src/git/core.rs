use crate::infrastructure::{CriticError, CriticResult};
use crate::models::repo::NO_REMOTE;
use crate::models::{RepoInfo, RepoInfoResult};
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use tokio::process::Command;

/// 一次 git 调用的输出
#[derive(Debug)]
pub(crate) struct GitOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// 失败时的错误文本，stderr 为空时退回到退出码
    pub fn error_text(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            format!("exit code {:?}", self.status.code())
        } else {
            stderr.to_string()
        }
    }
}

/// 在 `repo` 下运行 `git -C <repo> <args...>`
///
/// 只有进程无法启动时返回错误；非零退出码由调用方按场景解释。
pub(crate) async fn run_git(repo: &Path, args: &[&str]) -> CriticResult<GitOutput> {
    tracing::debug!("git -C {} {}", repo.display(), args.join(" "));

    let output = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .output()
        .await
        .map_err(|e| CriticError::tool(format!("git {}", args.first().unwrap_or(&"")), e.to_string()))?;

    Ok(GitOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

/// 运行 git 并要求成功，返回 stdout
pub(crate) async fn git_stdout(repo: &Path, args: &[&str]) -> CriticResult<String> {
    let output = run_git(repo, args).await?;
    if !output.success() {
        return Err(CriticError::tool(
            format!("git {}", args.join(" ")),
            output.error_text(),
        ));
    }
    Ok(output.stdout)
}

fn absolute_path(repo_path: &Path) -> PathBuf {
    std::fs::canonicalize(repo_path).unwrap_or_else(|_| {
        std::env::current_dir()
            .map(|cwd| cwd.join(repo_path))
            .unwrap_or_else(|_| repo_path.to_path_buf())
    })
}

/// 当前分支、origin 地址和是否有暂存改动
pub async fn get_repo_info(repo_path: &Path) -> RepoInfoResult {
    match repo_info(repo_path).await {
        Ok(info) => RepoInfoResult::Ok(info),
        Err(e) => {
            tracing::debug!("get_repo_info failed: {}", e);
            let reason = match e {
                CriticError::ToolInvocation { message, .. } => message,
                other => other.to_string(),
            };
            RepoInfoResult::Err {
                error: format!("Not a git repository or git error: {}", reason),
            }
        }
    }
}

async fn repo_info(repo_path: &Path) -> CriticResult<RepoInfo> {
    git_stdout(repo_path, &["rev-parse", "--git-dir"]).await?;

    // 还没有提交的仓库里 HEAD 无法解析，改用 symbolic-ref
    let branch = match git_stdout(repo_path, &["rev-parse", "--abbrev-ref", "HEAD"]).await {
        Ok(branch) => branch.trim().to_string(),
        Err(_) => git_stdout(repo_path, &["symbolic-ref", "--short", "HEAD"])
            .await
            .map(|b| b.trim().to_string())
            .unwrap_or_else(|_| "HEAD".to_string()),
    };

    let remote = match git_stdout(repo_path, &["remote", "get-url", "origin"]).await {
        Ok(url) if !url.trim().is_empty() => url.trim().to_string(),
        _ => NO_REMOTE.to_string(),
    };

    // 退出码非零表示有暂存改动
    let staged = run_git(repo_path, &["diff", "--staged", "--quiet"]).await?;

    Ok(RepoInfo {
        repo_path: absolute_path(repo_path),
        branch,
        remote,
        has_staged_changes: !staged.success(),
    })
}
