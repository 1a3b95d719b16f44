use async_trait::async_trait;

use super::models::{ThreadSummary, Turn, TurnRole};
use crate::infrastructure::CriticResult;

pub mod memory;

#[cfg(feature = "storage-sqlite")]
pub mod sqlite;

pub use memory::MemoryThreadStore;

#[cfg(feature = "storage-sqlite")]
pub use sqlite::SqliteThreadStore;

/// 会话线程存储
///
/// 线程在第一次追加时创建，记录只追加；删除只能通过 `clear` / `clear_all`。
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// 是否跨进程持久化
    fn is_persistent(&self) -> bool;

    /// 列出已知线程，最近活动的在前
    async fn list(&self) -> CriticResult<Vec<ThreadSummary>>;

    /// 删除一个线程，返回是否删除了内容
    async fn clear(&self, thread_id: &str) -> CriticResult<bool>;

    /// 删除所有线程，返回删除的线程数
    async fn clear_all(&self) -> CriticResult<usize>;

    /// 追加一条记录，返回带序号的记录
    async fn append(&self, thread_id: &str, role: TurnRole, agent: Option<&str>, content: &str) -> CriticResult<Turn>;

    /// 按序号返回线程的全部记录
    async fn history(&self, thread_id: &str) -> CriticResult<Vec<Turn>>;
}
