pub mod manager;
pub mod models;
pub mod providers;

pub use manager::{memory_store, open_thread_store};
pub use models::{generate_thread_id, get_or_create_thread_id, ThreadSummary, Turn, TurnRole};
pub use providers::{MemoryThreadStore, ThreadStore};

#[cfg(feature = "storage-sqlite")]
pub use providers::SqliteThreadStore;
