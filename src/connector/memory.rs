//! In-process backing resource

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::{DataConnector, Listing};
use crate::error::{ConnectorError, ConnectorResult};

/// Entries kept in memory, ordered by identifier.
///
/// Clones share the same entries, so one instance can back several state stores.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    entries: Arc<RwLock<BTreeMap<String, Value>>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the given entries
    pub fn with_entries<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        let entries = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl DataConnector<Value, String> for MemoryConnector {
    async fn fetch(&self, id: String) -> ConnectorResult<Value> {
        self.entries
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(ConnectorError::NotFound { id })
    }

    async fn list(&self) -> ConnectorResult<Listing<String, Value>> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .map(|(id, value)| (id.clone(), value.clone()))
            .collect())
    }

    async fn save(&self, id: String, value: Value) -> ConnectorResult<()> {
        debug!(%id, "Saving entry in memory");
        self.entries.write().await.insert(id, value);
        Ok(())
    }

    async fn remove(&self, id: String) -> ConnectorResult<()> {
        match self.entries.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(ConnectorError::NotFound { id }),
        }
    }

    async fn keys(&self) -> ConnectorResult<Vec<String>> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
