//! 提交信息的确认流程
//!
//! `SuggestionPresented -> {Accepted, Revising, CustomInput, Cancelled}`，
//! Revising 完成后回到 SuggestionPresented，轮数不限。
//! `CommitExecutor` 只在 Accepted 状态被调用，且只调用一次。

use crate::infrastructure::CriticResult;
use crate::models::{CommitResult, SuggestedCommit};
use async_trait::async_trait;
use std::fmt;

/// 用户在建议界面的选择
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Accept,
    Revise,
    Custom,
    Cancel,
    Unknown(String),
}

impl Choice {
    /// 去掉首尾空白后不区分大小写匹配
    pub fn parse(input: &str) -> Self {
        let normalized = input.trim().to_lowercase();
        match normalized.as_str() {
            "" | "y" | "yes" | "accept" => Choice::Accept,
            "r" | "revise" | "feedback" => Choice::Revise,
            "c" | "custom" => Choice::Custom,
            "n" | "no" | "cancel" | "q" | "quit" => Choice::Cancel,
            _ => Choice::Unknown(normalized),
        }
    }
}

/// 已被用户确认、可以提交的信息
///
/// 只能在本 crate 内构造，外部拿到它就说明确认流程已经走到 Accepted。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovedMessage(String);

impl ApprovedMessage {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ApprovedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelReason {
    /// n / no / cancel / q / quit
    Declined,
    UnknownOption(String),
    EmptyCustomMessage,
    RevisionFailed(String),
    /// 输入流结束或读取失败
    InputClosed,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Declined => write!(f, "Commit cancelled."),
            CancelReason::UnknownOption(option) => write!(f, "Unknown option '{}'. Commit cancelled.", option),
            CancelReason::EmptyCustomMessage => write!(f, "No message provided. Commit cancelled."),
            CancelReason::RevisionFailed(error) => write!(f, "Revision failed: {}. Commit cancelled.", error),
            CancelReason::InputClosed => write!(f, "Input closed. Commit cancelled."),
        }
    }
}

/// 状态机的状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalState {
    SuggestionPresented(SuggestedCommit),
    Revising(SuggestedCommit),
    CustomInput,
    Accepted(ApprovedMessage),
    Cancelled(CancelReason),
}

/// 终端交互
pub trait Prompter {
    /// 展示当前建议；`revision` 为已完成的修改轮数
    fn present(&mut self, suggestion: &SuggestedCommit, revision: usize);

    /// 读取选项
    fn choose(&mut self) -> CriticResult<String>;

    /// 读取修改意见
    fn feedback(&mut self) -> CriticResult<String>;

    /// 读取自定义提交信息
    fn custom_message(&mut self) -> CriticResult<String>;
}

/// 根据反馈重新生成建议
#[async_trait]
pub trait Reviser: Send + Sync {
    async fn revise(&self, current: &SuggestedCommit, feedback: &str) -> CriticResult<SuggestedCommit>;
}

/// 真正执行提交
#[async_trait]
pub trait CommitExecutor: Send + Sync {
    async fn execute(&self, message: ApprovedMessage) -> CommitResult;
}

/// 流程结束时的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalOutcome {
    Committed {
        message: String,
        result: CommitResult,
        revisions: usize,
    },
    Cancelled {
        reason: CancelReason,
        revisions: usize,
    },
}

impl ApprovalOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, ApprovalOutcome::Committed { result, .. } if result.success)
    }
}

pub struct ApprovalWorkflow<'a, P: Prompter> {
    prompter: P,
    reviser: &'a dyn Reviser,
    executor: &'a dyn CommitExecutor,
}

impl<'a, P: Prompter> ApprovalWorkflow<'a, P> {
    pub fn new(prompter: P, reviser: &'a dyn Reviser, executor: &'a dyn CommitExecutor) -> Self {
        Self {
            prompter,
            reviser,
            executor,
        }
    }

    /// 单步状态转移；Accepted 和 Cancelled 为终态，原样返回
    pub async fn step(&mut self, state: ApprovalState, revisions: &mut usize) -> ApprovalState {
        match state {
            ApprovalState::SuggestionPresented(suggestion) => {
                self.prompter.present(&suggestion, *revisions);
                let input = match self.prompter.choose() {
                    Ok(input) => input,
                    Err(e) => {
                        tracing::debug!("Reading choice failed: {}", e);
                        return ApprovalState::Cancelled(CancelReason::InputClosed);
                    }
                };
                match Choice::parse(&input) {
                    Choice::Accept => ApprovalState::Accepted(ApprovedMessage::new(suggestion.full_message())),
                    Choice::Revise => ApprovalState::Revising(suggestion),
                    Choice::Custom => ApprovalState::CustomInput,
                    Choice::Cancel => ApprovalState::Cancelled(CancelReason::Declined),
                    Choice::Unknown(option) => ApprovalState::Cancelled(CancelReason::UnknownOption(option)),
                }
            }
            ApprovalState::Revising(current) => {
                let feedback = match self.prompter.feedback() {
                    Ok(feedback) => feedback,
                    Err(_) => return ApprovalState::Cancelled(CancelReason::InputClosed),
                };
                let feedback = feedback.trim();
                if feedback.is_empty() {
                    return ApprovalState::SuggestionPresented(current);
                }
                match self.reviser.revise(&current, feedback).await {
                    Ok(revised) => {
                        *revisions += 1;
                        ApprovalState::SuggestionPresented(revised)
                    }
                    Err(e) => {
                        tracing::warn!("Revision failed: {}", e);
                        ApprovalState::Cancelled(CancelReason::RevisionFailed(e.to_string()))
                    }
                }
            }
            ApprovalState::CustomInput => match self.prompter.custom_message() {
                Ok(text) if !text.trim().is_empty() => ApprovalState::Accepted(ApprovedMessage::new(text)),
                Ok(_) => ApprovalState::Cancelled(CancelReason::EmptyCustomMessage),
                Err(_) => ApprovalState::Cancelled(CancelReason::InputClosed),
            },
            terminal @ (ApprovalState::Accepted(_) | ApprovalState::Cancelled(_)) => terminal,
        }
    }

    /// 运行到终态；只有 Accepted 会触发一次提交
    pub async fn run(mut self, initial: SuggestedCommit) -> ApprovalOutcome {
        let mut revisions = 0;
        let mut state = ApprovalState::SuggestionPresented(initial);

        loop {
            state = match state {
                ApprovalState::Accepted(message) => {
                    let text = message.as_str().to_string();
                    let result = self.executor.execute(message).await;
                    return ApprovalOutcome::Committed {
                        message: text,
                        result,
                        revisions,
                    };
                }
                ApprovalState::Cancelled(reason) => {
                    return ApprovalOutcome::Cancelled { reason, revisions };
                }
                other => self.step(other, &mut revisions).await,
            };
        }
    }
}
