//! git 子进程封装
//!
//! 五个操作都返回可序列化的结果结构，工具失败不会中断进程。
//! 除 clone 外的调用没有超时，git 卡住时会一直等待。

pub mod clone;
pub mod commit;
pub mod core;
pub mod history;
pub mod staged;

pub use self::clone::{clone_repo, clone_repo_with_timeout, validate_url};
pub use self::commit::create_commit;
pub use self::core::get_repo_info;
pub use self::history::{clamp_limit, fetch_commits, parse_log_output};
pub use self::staged::{get_staged_diff, truncate_chars};
