use crate::config::Config;
use crate::storage::ThreadStore;
use crate::ui;

/// `--threads`
pub async fn list_threads(store: &dyn ThreadStore, config: &Config) -> anyhow::Result<i32> {
    let threads = store.list().await?;
    print!("{}", ui::render_threads(&threads, store.is_persistent(), &config.checkpoint_db()));
    Ok(0)
}

/// `--clear-threads [--thread ID]`
pub async fn clear_threads(store: &dyn ThreadStore, thread_id: Option<&str>) -> anyhow::Result<i32> {
    if !store.is_persistent() {
        println!("⚠️  线程持久化不可用，没有可清除的历史。");
    }

    match thread_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => {
            if store.clear(id).await? {
                println!("Cleared thread: {}", id);
            } else {
                println!("Thread not found: {}", id);
            }
        }
        None => {
            let count = store.clear_all().await?;
            println!("Cleared {} thread(s)", count);
        }
    }
    Ok(0)
}
