pub mod commit;
pub mod repo;
pub mod suggestion;

pub use commit::{AnalysisReport, Category, Commit, CommitAnalysis};
pub use repo::{
    CloneFailureReason, CloneResult, CommitList, CommitResult, RepoInfo, RepoInfoResult, StagedChanges,
};
pub use suggestion::{CommitType, SuggestedCommit};
