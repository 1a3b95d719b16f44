mod common;

use common::{commit_file, git, init_repo, stage_file};
use commit_critic::git::{clone_repo, clone_repo_with_timeout, create_commit, fetch_commits, get_repo_info, get_staged_diff};
use commit_critic::models::repo::{MAX_DIFF_CHARS, NO_REMOTE, NO_STAGED_MESSAGE};
use commit_critic::models::{CloneFailureReason, RepoInfoResult};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

/// 用 fast-import 一次写入大量提交
fn import_commits(repo: &Path, count: usize) {
    let mut stream = String::new();
    for i in 0..count {
        let message = format!("chore: commit number {}\n", i);
        stream.push_str("commit refs/heads/main\n");
        stream.push_str(&format!("committer Test User <test@example.com> {} +0000\n", 1_700_000_000 + i));
        stream.push_str(&format!("data {}\n{}\n", message.len(), message));
    }

    let mut child = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(["fast-import", "--quiet"])
        .stdin(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(stream.as_bytes()).unwrap();
    assert!(child.wait().unwrap().success());
    git(repo, &["symbolic-ref", "HEAD", "refs/heads/main"]);
}

#[tokio::test]
async fn test_fetch_commits_splits_subject_and_body() {
    let repo = init_repo();
    commit_file(repo.path(), "a.txt", "a", "fix");
    commit_file(
        repo.path(),
        "b.txt",
        "b",
        "feat(auth): add token refresh with rotation, tests, docs\n\nRotate refresh tokens on every use.",
    );

    let list = fetch_commits(repo.path(), 10).await;
    assert!(list.error.is_none());
    assert_eq!(list.commits.len(), 2);

    // 最新的在前
    let newest = &list.commits[0];
    assert_eq!(newest.hash.len(), 8);
    assert_eq!(newest.message, "feat(auth): add token refresh with rotation, tests, docs");
    assert_eq!(newest.body, "Rotate refresh tokens on every use.");
    assert_eq!(list.commits[1].message, "fix");
    assert_eq!(list.commits[1].body, "");
}

#[tokio::test]
async fn test_fetch_commits_clamps_limit() {
    let repo = init_repo();
    import_commits(repo.path(), 505);

    let list = fetch_commits(repo.path(), 500).await;
    assert_eq!(list.commits.len(), 500);

    let list = fetch_commits(repo.path(), 10_000).await;
    assert_eq!(list.commits.len(), 500);

    assert_eq!(fetch_commits(repo.path(), 0).await.commits.len(), 1);
    assert_eq!(fetch_commits(repo.path(), -3).await.commits.len(), 1);
}

#[tokio::test]
async fn test_fetch_commits_outside_repository_is_error_payload() {
    let dir = tempfile::TempDir::new().unwrap();
    let list = fetch_commits(dir.path(), 10).await;
    assert!(list.commits.is_empty());
    assert!(list.error.unwrap().starts_with("Failed to fetch commits"));
}

#[tokio::test]
async fn test_staged_diff_with_nothing_staged() {
    let repo = init_repo();
    commit_file(repo.path(), "a.txt", "a", "init");

    let changes = get_staged_diff(repo.path()).await;
    assert!(!changes.has_staged);
    assert_eq!(changes.message.as_deref(), Some(NO_STAGED_MESSAGE));
    assert!(changes.diff.is_none());
    assert!(changes.stat.is_none());
    assert!(changes.files.is_empty());
    assert!(changes.file_count.is_none());
}

#[tokio::test]
async fn test_staged_diff_lists_files_and_truncates() {
    let repo = init_repo();
    commit_file(repo.path(), "a.txt", "a", "init");
    stage_file(repo.path(), "big.txt", &"改动内容\n".repeat(3000));
    stage_file(repo.path(), "small.txt", "small\n");

    let changes = get_staged_diff(repo.path()).await;
    assert!(changes.has_staged);
    assert_eq!(changes.files, vec!["big.txt", "small.txt"]);
    assert_eq!(changes.file_count, Some(2));
    assert_eq!(changes.diff.as_ref().unwrap().chars().count(), MAX_DIFF_CHARS);
    assert!(changes.stat.unwrap().contains("big.txt"));
}

#[tokio::test]
async fn test_create_commit_uses_message_verbatim() {
    let repo = init_repo();
    commit_file(repo.path(), "a.txt", "a", "init");
    stage_file(repo.path(), "b.txt", "b");

    let result = create_commit("docs: fix typo", repo.path()).await;
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.message.as_deref(), Some("docs: fix typo"));
    assert_eq!(common::head_message(repo.path()), "docs: fix typo");
}

#[tokio::test]
async fn test_create_commit_without_staged_changes_fails() {
    let repo = init_repo();
    commit_file(repo.path(), "a.txt", "a", "init");

    let result = create_commit("chore: nothing", repo.path()).await;
    assert!(!result.success);
    assert!(result.error.unwrap().starts_with("Commit failed"));
    assert_eq!(common::commit_count(repo.path()), 1);
}

#[tokio::test]
async fn test_repo_info() {
    let repo = init_repo();
    commit_file(repo.path(), "a.txt", "a", "init");
    git(repo.path(), &["checkout", "-q", "-b", "feature/x"]);

    let RepoInfoResult::Ok(info) = get_repo_info(repo.path()).await else {
        panic!("expected repo info");
    };
    assert_eq!(info.branch, "feature/x");
    assert_eq!(info.remote, NO_REMOTE);
    assert!(!info.has_staged_changes);
    assert!(info.repo_path.is_absolute());

    git(repo.path(), &["remote", "add", "origin", "https://example.com/org/repo.git"]);
    stage_file(repo.path(), "b.txt", "b");
    let info = get_repo_info(repo.path()).await;
    let info = info.info().unwrap();
    assert_eq!(info.remote, "https://example.com/org/repo.git");
    assert!(info.has_staged_changes);
}

#[tokio::test]
async fn test_repo_info_outside_repository() {
    let dir = tempfile::TempDir::new().unwrap();
    match get_repo_info(dir.path()).await {
        RepoInfoResult::Err { error } => assert!(error.starts_with("Not a git repository")),
        RepoInfoResult::Ok(info) => panic!("unexpected repo info: {:?}", info),
    }
}

#[tokio::test]
async fn test_clone_rejects_unsupported_scheme() {
    let result = clone_repo("ftp://example.com/x").await;
    assert!(!result.success);
    assert_eq!(result.reason, Some(CloneFailureReason::InvalidUrl));
    assert!(result.repo_path.is_none());

    let result = clone_repo("   ").await;
    assert_eq!(result.error.as_deref(), Some("Empty URL provided"));
}

#[tokio::test]
async fn test_clone_local_bare_repository_over_file_scheme_is_rejected() {
    let repo = init_repo();
    commit_file(repo.path(), "a.txt", "a", "init");
    let url = format!("file://{}", repo.path().display());
    let result = clone_repo(&url).await;
    assert_eq!(result.reason, Some(CloneFailureReason::InvalidUrl));
}

#[tokio::test]
async fn test_clone_timeout_is_reported_separately() {
    // 不可路由地址，连接会一直挂起
    let result = clone_repo_with_timeout("https://10.255.255.1/team/repo.git", Duration::from_millis(1)).await;
    assert!(!result.success);
    assert_eq!(result.reason, Some(CloneFailureReason::Timeout));
    let error = result.error.unwrap();
    assert!(error.starts_with("Clone timed out"), "{}", error);
    assert!(!error.starts_with("Clone failed"));
}
