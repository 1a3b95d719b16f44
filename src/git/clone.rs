use crate::infrastructure::{CriticError, CriticResult};
use crate::models::repo::{CLONE_DEPTH, CLONE_TIMEOUT_SECS};
use crate::models::{CloneFailureReason, CloneResult};
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;

const ALLOWED_PREFIXES: [&str; 4] = ["https://", "http://", "git://", "git@"];
const TEMP_PREFIX: &str = "commit_critic_";

/// 校验仓库地址，只接受 https / http / git 协议和 git@ 形式
pub fn validate_url(url: &str) -> CriticResult<&str> {
    let url = url.trim();
    if url.is_empty() {
        return Err(CriticError::validation("Empty URL provided", Some("url")));
    }
    if !ALLOWED_PREFIXES.iter().any(|prefix| url.starts_with(prefix)) {
        return Err(CriticError::validation(
            "Invalid URL protocol. Use https://, http://, git://, or git@ URLs",
            Some("url"),
        ));
    }
    Ok(url)
}

/// 在系统临时目录下新建 `commit_critic_*` 目录，用完不删除
fn create_clone_dir() -> std::io::Result<PathBuf> {
    let dir = std::env::temp_dir().join(format!("{}{}", TEMP_PREFIX, uuid::Uuid::new_v4().simple()));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// 浅克隆远程仓库（depth 50，60 秒超时）
pub async fn clone_repo(url: &str) -> CloneResult {
    clone_repo_with_timeout(url, Duration::from_secs(CLONE_TIMEOUT_SECS)).await
}

pub async fn clone_repo_with_timeout(url: &str, timeout: Duration) -> CloneResult {
    let url = match validate_url(url) {
        Ok(url) => url,
        Err(CriticError::Validation { message, .. }) => {
            return CloneResult::failed(CloneFailureReason::InvalidUrl, message)
        }
        Err(e) => return CloneResult::failed(CloneFailureReason::InvalidUrl, e.to_string()),
    };

    let dir = match create_clone_dir() {
        Ok(dir) => dir,
        Err(e) => return CloneResult::failed(CloneFailureReason::Io, format!("Cannot create temp dir: {}", e)),
    };

    tracing::info!("Cloning {} into {}", url, dir.display());

    let depth = format!("--depth={}", CLONE_DEPTH);
    let clone = Command::new("git")
        .args(["clone", depth.as_str(), url])
        .arg(&dir)
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(timeout, clone).await {
        Err(_) => {
            let err = CriticError::timeout("git clone", timeout.as_secs());
            tracing::warn!("{}", err);
            CloneResult::failed(
                CloneFailureReason::Timeout,
                format!(
                    "Clone timed out after {} seconds. Repository may be too large or network is slow.",
                    timeout.as_secs()
                ),
            )
        }
        Ok(Err(e)) => CloneResult::failed(CloneFailureReason::Io, format!("Failed to run git clone: {}", e)),
        Ok(Ok(output)) if !output.status.success() => CloneResult::failed(
            CloneFailureReason::CloneFailed,
            format!("Clone failed: {}", String::from_utf8_lossy(&output.stderr).trim()),
        ),
        Ok(Ok(_)) => CloneResult::cloned(dir, url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_accepts_supported_schemes() {
        assert_eq!(validate_url("  https://github.com/a/b  ").unwrap(), "https://github.com/a/b");
        assert!(validate_url("http://example.com/x.git").is_ok());
        assert!(validate_url("git://example.com/x.git").is_ok());
        assert!(validate_url("git@github.com:a/b.git").is_ok());
    }

    #[test]
    fn test_validate_url_rejects_others() {
        let err = validate_url("").unwrap_err();
        assert_eq!(
            err,
            CriticError::Validation {
                message: "Empty URL provided".into(),
                field: Some("url".into())
            }
        );
        assert!(validate_url("ftp://example.com/x").is_err());
        assert!(validate_url("file:///tmp/repo").is_err());
        assert!(validate_url("/tmp/repo").is_err());
    }

    #[tokio::test]
    async fn test_invalid_url_never_spawns_clone() {
        let result = clone_repo("ftp://example.com/x").await;
        assert!(!result.success);
        assert_eq!(result.reason, Some(CloneFailureReason::InvalidUrl));
        assert!(result.repo_path.is_none());
    }
}
