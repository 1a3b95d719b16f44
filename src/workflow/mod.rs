//! 交互式确认流程

pub mod approval;

pub use approval::{
    ApprovalOutcome, ApprovalState, ApprovalWorkflow, ApprovedMessage, CancelReason, Choice, CommitExecutor,
    Prompter, Reviser,
};
