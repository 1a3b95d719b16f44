use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::ThreadStore;
use crate::infrastructure::{CriticError, CriticResult};
use crate::storage::models::{validate_thread_id, ThreadSummary, Turn, TurnRole};

fn db_error(err: sqlx::Error) -> CriticError {
    CriticError::storage("sqlite", err.to_string())
}

fn parse_timestamp(value: &str) -> CriticResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CriticError::storage("sqlite", format!("invalid timestamp {}: {}", value, e)))
}

/// SQLite 线程存储
pub struct SqliteThreadStore {
    pool: SqlitePool,
    path: PathBuf,
}

impl SqliteThreadStore {
    /// 打开（必要时创建）数据库文件
    pub async fn open(path: &Path) -> CriticResult<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CriticError::storage("sqlite", format!("cannot create {}: {}", parent.display(), e)))?;
        }

        let options = SqliteConnectOptions::new().filename(path).create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(db_error)?;

        let store = Self {
            pool,
            path: path.to_path_buf(),
        };
        store.create_tables().await?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 创建数据库表
    async fn create_tables(&self) -> CriticResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS turns (
                thread_id TEXT NOT NULL,
                seq INTEGER NOT NULL,
                role TEXT NOT NULL,
                agent TEXT,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (thread_id, seq)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        info!("SQLite thread store ready at {}", self.path.display());
        Ok(())
    }

    fn row_to_turn(row: &SqliteRow) -> CriticResult<Turn> {
        let role: String = row.try_get("role").map_err(db_error)?;
        let created_at: String = row.try_get("created_at").map_err(db_error)?;
        Ok(Turn {
            thread_id: row.try_get("thread_id").map_err(db_error)?,
            seq: row.try_get("seq").map_err(db_error)?,
            role: role.parse()?,
            agent: row.try_get("agent").map_err(db_error)?,
            content: row.try_get("content").map_err(db_error)?,
            created_at: parse_timestamp(&created_at)?,
        })
    }
}

#[async_trait]
impl ThreadStore for SqliteThreadStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn list(&self) -> CriticResult<Vec<ThreadSummary>> {
        let rows = sqlx::query(
            "SELECT thread_id, COUNT(*) AS turn_count, MAX(created_at) AS updated_at \
             FROM turns GROUP BY thread_id ORDER BY updated_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter()
            .map(|row| -> CriticResult<ThreadSummary> {
                let count: i64 = row.try_get("turn_count").map_err(db_error)?;
                let updated_at: String = row.try_get("updated_at").map_err(db_error)?;
                Ok(ThreadSummary {
                    thread_id: row.try_get("thread_id").map_err(db_error)?,
                    turn_count: count.max(0) as usize,
                    updated_at: parse_timestamp(&updated_at)?,
                })
            })
            .collect()
    }

    async fn clear(&self, thread_id: &str) -> CriticResult<bool> {
        let result = sqlx::query("DELETE FROM turns WHERE thread_id = ?")
            .bind(thread_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        debug!("Cleared thread {} ({} turns)", thread_id, result.rows_affected());
        Ok(result.rows_affected() > 0)
    }

    async fn clear_all(&self) -> CriticResult<usize> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT thread_id) FROM turns")
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error)?;
        sqlx::query("DELETE FROM turns")
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        tx.commit().await.map_err(db_error)?;
        Ok(count.max(0) as usize)
    }

    async fn append(&self, thread_id: &str, role: TurnRole, agent: Option<&str>, content: &str) -> CriticResult<Turn> {
        validate_thread_id(thread_id)?;
        let created_at = Utc::now();

        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let seq: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(seq), 0) + 1 FROM turns WHERE thread_id = ?")
            .bind(thread_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error)?;

        sqlx::query(
            "INSERT INTO turns (thread_id, seq, role, agent, content, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(thread_id)
        .bind(seq)
        .bind(role.as_str())
        .bind(agent)
        .bind(content)
        .bind(created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;
        tx.commit().await.map_err(db_error)?;

        Ok(Turn {
            thread_id: thread_id.to_string(),
            seq,
            role,
            agent: agent.map(str::to_string),
            content: content.to_string(),
            created_at,
        })
    }

    async fn history(&self, thread_id: &str) -> CriticResult<Vec<Turn>> {
        let rows = sqlx::query(
            "SELECT thread_id, seq, role, agent, content, created_at FROM turns WHERE thread_id = ? ORDER BY seq",
        )
        .bind(thread_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(Self::row_to_turn).collect()
    }
}
