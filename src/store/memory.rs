use super::{KeyValueCollection, KeyValueStore};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-memory collection, lost when dropped.
#[derive(Clone, Default)]
pub struct MemoryCollection {
    inner: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueCollection for MemoryCollection {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let values = self.inner.lock().await;
        Ok(values.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let mut values = self.inner.lock().await;
        values.insert(key.to_string(), value);
        Ok(())
    }
}

impl KeyValueStore<MemoryCollection> {
    pub fn new() -> Self {
        Self::new_with(MemoryCollection::new())
    }
}

impl Default for KeyValueStore<MemoryCollection> {
    fn default() -> Self {
        Self::new()
    }
}
