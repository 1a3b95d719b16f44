#![allow(dead_code)]

use async_trait::async_trait;
use commit_critic::ai::provider::{AIProvider, ChatMessage, ProviderConfig};
use commit_critic::infrastructure::{CriticError, CriticResult};
use std::collections::VecDeque;
use std::path::Path;
use std::process::Command;
use std::sync::Mutex;
use tempfile::TempDir;

/// 在临时目录初始化 git 仓库并配置提交者
pub fn init_repo() -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    git(dir.path(), &["init", "-q"]);
    git(dir.path(), &["config", "user.name", "Test User"]);
    git(dir.path(), &["config", "user.email", "test@example.com"]);
    git(dir.path(), &["config", "commit.gpgsign", "false"]);
    dir
}

pub fn git(repo: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .output()
        .expect("run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// 写文件并提交
pub fn commit_file(repo: &Path, file: &str, content: &str, message: &str) {
    std::fs::write(repo.join(file), content).expect("write file");
    git(repo, &["add", file]);
    git(repo, &["commit", "-q", "-m", message]);
}

pub fn stage_file(repo: &Path, file: &str, content: &str) {
    std::fs::write(repo.join(file), content).expect("write file");
    git(repo, &["add", file]);
}

pub fn head_message(repo: &Path) -> String {
    git(repo, &["log", "-1", "--format=%B"]).trim_end().to_string()
}

pub fn commit_count(repo: &Path) -> usize {
    Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(["rev-list", "--count", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8_lossy(&o.stdout).trim().parse().ok())
        .unwrap_or(0)
}

/// 按顺序返回预设回复的 provider
pub struct MockProvider {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockProvider {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<Vec<ChatMessage>> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl AIProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn chat(&self, _system: &str, messages: &[ChatMessage], _config: &ProviderConfig) -> CriticResult<String> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CriticError::provider("mock", "no scripted reply left", false))
    }
}
