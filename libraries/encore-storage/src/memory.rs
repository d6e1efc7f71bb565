//! In-memory session state store

use async_trait::async_trait;
use encore_core::{PersistenceAdapter, PersistenceError};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory key/value store for tests and ephemeral sessions.
///
/// Same contract as the durable stores, no durability.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryStateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    /// Whether the store is empty
    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }
}

#[async_trait]
impl PersistenceAdapter for MemoryStateStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, PersistenceError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), PersistenceError> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.values.write().await.remove(key);
        Ok(())
    }
}
