//! git 操作的结构化结果
//!
//! 所有工具层失败都以这些结构体的 `error` 字段返回，字段缺省时不序列化。

use super::commit::Commit;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 500;
pub const CLONE_DEPTH: u32 = 50;
pub const CLONE_TIMEOUT_SECS: u64 = 60;
pub const MAX_DIFF_CHARS: usize = 5000;
pub const NO_REMOTE: &str = "No remote configured";
pub const NO_STAGED_MESSAGE: &str = "No staged changes found. Stage files with 'git add' first.";

/// `fetch_commits` 的结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitList {
    pub commits: Vec<Commit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommitList {
    pub fn ok(commits: Vec<Commit>) -> Self {
        Self { commits, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            commits: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// 克隆失败原因，超时与一般失败分开
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloneFailureReason {
    InvalidUrl,
    Timeout,
    CloneFailed,
    Io,
}

/// `clone_repo` 的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<CloneFailureReason>,
}

impl CloneResult {
    pub fn cloned(repo_path: PathBuf, url: &str) -> Self {
        Self {
            success: true,
            message: Some(format!("Cloned {} to {}", url, repo_path.display())),
            repo_path: Some(repo_path),
            error: None,
            reason: None,
        }
    }

    pub fn failed(reason: CloneFailureReason, error: impl Into<String>) -> Self {
        Self {
            success: false,
            repo_path: None,
            message: None,
            error: Some(error.into()),
            reason: Some(reason),
        }
    }
}

/// `get_staged_diff` 的结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedChanges {
    pub has_staged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StagedChanges {
    pub fn staged(stat: String, diff: String, files: Vec<String>) -> Self {
        Self {
            has_staged: true,
            stat: Some(stat),
            diff: Some(diff),
            file_count: Some(files.len()),
            files,
            message: None,
            error: None,
        }
    }

    pub fn nothing_staged() -> Self {
        Self {
            message: Some(NO_STAGED_MESSAGE.to_string()),
            ..Default::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// `create_commit` 的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommitResult {
    pub fn committed(message: &str, output: String) -> Self {
        Self {
            success: true,
            output: Some(output),
            message: Some(message.to_string()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            message: None,
            error: Some(error.into()),
        }
    }
}

/// 当前仓库状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInfo {
    pub repo_path: PathBuf,
    pub branch: String,
    pub remote: String,
    pub has_staged_changes: bool,
}

/// `get_repo_info` 的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepoInfoResult {
    Ok(RepoInfo),
    Err { error: String },
}

impl RepoInfoResult {
    pub fn info(&self) -> Option<&RepoInfo> {
        match self {
            RepoInfoResult::Ok(info) => Some(info),
            RepoInfoResult::Err { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_staged_omits_diff_fields() {
        let json = serde_json::to_value(StagedChanges::nothing_staged()).unwrap();
        assert_eq!(json["has_staged"], false);
        assert_eq!(json["message"], NO_STAGED_MESSAGE);
        for field in ["stat", "diff", "files", "file_count", "error"] {
            assert!(json.get(field).is_none(), "{} should be absent", field);
        }
    }

    #[test]
    fn test_staged_file_count_matches_files() {
        let changes = StagedChanges::staged(
            " 2 files changed".into(),
            "diff --git".into(),
            vec!["src/a.rs".into(), "README.md".into()],
        );
        assert_eq!(changes.file_count, Some(2));
        assert_eq!(changes.files, vec!["src/a.rs", "README.md"]);
    }

    #[test]
    fn test_commit_list_failure_shape() {
        let json = serde_json::to_value(CommitList::failed("not a git repository")).unwrap();
        assert_eq!(json["commits"], serde_json::json!([]));
        assert_eq!(json["error"], "not a git repository");
    }

    #[test]
    fn test_repo_info_result_is_untagged() {
        let err = RepoInfoResult::Err {
            error: "Not a git repository".into(),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!({"error": "Not a git repository"}));
        assert!(err.info().is_none());
    }

    #[test]
    fn test_clone_failure_reason_serialized() {
        let result = CloneResult::failed(CloneFailureReason::Timeout, "Clone timed out after 60 seconds");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["reason"], "timeout");
        assert!(json.get("repo_path").is_none());
    }
}
