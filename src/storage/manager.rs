use std::sync::Arc;
use tracing::{info, warn};

use super::providers::{MemoryThreadStore, ThreadStore};
use crate::config::Config;

/// 打开线程存储
///
/// 优先使用 `<home>/checkpoints.db`；数据库不可用时退回到本进程内的内存存储。
pub async fn open_thread_store(config: &Config) -> Arc<dyn ThreadStore> {
    #[cfg(feature = "storage-sqlite")]
    {
        let path = config.checkpoint_db();
        match super::providers::SqliteThreadStore::open(&path).await {
            Ok(store) => return Arc::new(store),
            Err(e) => warn!("Thread persistence unavailable, using in-memory store: {}", e),
        }
    }

    #[cfg(not(feature = "storage-sqlite"))]
    info!(
        "Built without storage-sqlite, threads for {} are kept in memory",
        config.home_dir.display()
    );

    memory_store()
}

/// 本次运行专用的内存存储
pub fn memory_store() -> Arc<dyn ThreadStore> {
    info!("Using in-memory thread store");
    Arc::new(MemoryThreadStore::new())
}
