use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::ThreadStore;
use crate::infrastructure::{CriticError, CriticResult};
use crate::storage::models::{validate_thread_id, ThreadSummary, Turn, TurnRole};

/// 进程内存储，进程退出即丢弃
#[derive(Debug, Default)]
pub struct MemoryThreadStore {
    threads: Mutex<BTreeMap<String, Vec<Turn>>>,
}

impl MemoryThreadStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> CriticResult<std::sync::MutexGuard<'_, BTreeMap<String, Vec<Turn>>>> {
        self.threads
            .lock()
            .map_err(|_| CriticError::storage("memory", "thread store lock poisoned"))
    }
}

#[async_trait]
impl ThreadStore for MemoryThreadStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn list(&self) -> CriticResult<Vec<ThreadSummary>> {
        let threads = self.lock()?;
        let mut summaries: Vec<ThreadSummary> = threads
            .iter()
            .filter_map(|(id, turns)| {
                turns.last().map(|last| ThreadSummary {
                    thread_id: id.clone(),
                    turn_count: turns.len(),
                    updated_at: last.created_at,
                })
            })
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    async fn clear(&self, thread_id: &str) -> CriticResult<bool> {
        Ok(self.lock()?.remove(thread_id).is_some())
    }

    async fn clear_all(&self) -> CriticResult<usize> {
        let mut threads = self.lock()?;
        let count = threads.len();
        threads.clear();
        Ok(count)
    }

    async fn append(&self, thread_id: &str, role: TurnRole, agent: Option<&str>, content: &str) -> CriticResult<Turn> {
        validate_thread_id(thread_id)?;
        let mut threads = self.lock()?;
        let turns = threads.entry(thread_id.to_string()).or_default();
        let turn = Turn {
            thread_id: thread_id.to_string(),
            seq: turns.len() as i64 + 1,
            role,
            agent: agent.map(str::to_string),
            content: content.to_string(),
            created_at: Utc::now(),
        };
        turns.push(turn.clone());
        Ok(turn)
    }

    async fn history(&self, thread_id: &str) -> CriticResult<Vec<Turn>> {
        Ok(self.lock()?.get(thread_id).cloned().unwrap_or_default())
    }
}
