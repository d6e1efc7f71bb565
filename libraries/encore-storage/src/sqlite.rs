//! SQLite-backed session state store

use crate::error::Result;
use async_trait::async_trait;
use encore_core::{PersistenceAdapter, PersistenceError};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::debug;

/// Durable key/value store over a single SQLite table.
///
/// One row per session-state key; values are JSON text. The pool is
/// capped at one connection: a device-scoped store has a single writer,
/// and the cap makes write ordering match issue order.
pub struct SqliteStateStore {
    pool: SqlitePool,
}

impl SqliteStateStore {
    /// Open (creating if missing) the database at `url` and ensure the
    /// schema exists.
    ///
    /// Accepts any SQLite connection URL, e.g. `sqlite://state.db` or
    /// `sqlite::memory:`.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init().await?;
        debug!(url, "opened session state store");
        Ok(store)
    }

    /// Wrap an existing pool and ensure the schema exists
    pub async fn with_pool(pool: SqlitePool) -> Result<Self> {
        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS session_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl PersistenceAdapter for SqliteStateStore {
    async fn get(&self, key: &str) -> std::result::Result<Option<Value>, PersistenceError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM session_state WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| PersistenceError::Backend(e.to_string()))?;

        match row {
            Some((text,)) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value) -> std::result::Result<(), PersistenceError> {
        let text = serde_json::to_string(&value)?;
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            "INSERT INTO session_state (key, value, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT(key)
             DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(text)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| PersistenceError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> std::result::Result<(), PersistenceError> {
        sqlx::query("DELETE FROM session_state WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| PersistenceError::Backend(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn memory_store() -> SqliteStateStore {
        SqliteStateStore::connect("sqlite::memory:")
            .await
            .expect("in-memory store")
    }

    #[tokio::test]
    async fn get_missing_key_is_none() {
        let store = memory_store().await;
        assert_eq!(store.get("queue").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = memory_store().await;
        let value = json!({"items": ["a", "b"], "n": 3});

        store.set("queue", value.clone()).await.unwrap();
        assert_eq!(store.get("queue").await.unwrap(), Some(value));
    }

    #[tokio::test]
    async fn set_overwrites_previous_value() {
        let store = memory_store().await;
        store.set("current-index", json!(0)).await.unwrap();
        store.set("current-index", json!(2)).await.unwrap();

        assert_eq!(store.get("current-index").await.unwrap(), Some(json!(2)));
    }

    #[tokio::test]
    async fn remove_deletes_only_that_key() {
        let store = memory_store().await;
        store.set("favorites", json!(["youtube:a"])).await.unwrap();
        store.set("playback-speed", json!(1.5)).await.unwrap();

        store.remove("favorites").await.unwrap();

        assert_eq!(store.get("favorites").await.unwrap(), None);
        assert_eq!(
            store.get("playback-speed").await.unwrap(),
            Some(json!(1.5))
        );
    }

    #[tokio::test]
    async fn state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("state.db").display());

        {
            let store = SqliteStateStore::connect(&url).await.unwrap();
            store.set("queue", json!(["a"])).await.unwrap();
        }

        let store = SqliteStateStore::connect(&url).await.unwrap();
        assert_eq!(store.get("queue").await.unwrap(), Some(json!(["a"])));
    }
}
