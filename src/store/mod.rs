pub mod disk;
pub mod memory;

use crate::core::currency::{CurrencyCode, RateSnapshot};
use crate::core::history::HistoryEntry;
use crate::core::storage::PersistenceStore;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

pub use disk::DiskCollection;
pub use memory::MemoryCollection;

const RATES_KEY: &str = "exchange_rates";
const SELECTED_CURRENCIES_KEY: &str = "selected_currencies";
const VISIBLE_COUNT_KEY: &str = "visible_count";
const HISTORY_KEY: &str = "conversion_history";

/// Raw byte storage behind a [`KeyValueStore`].
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()>;
}

/// Persists converter state as JSON values in a key-value collection.
pub struct KeyValueStore<C: KeyValueCollection> {
    collection: C,
}

pub type DiskStore = KeyValueStore<DiskCollection>;
pub type MemoryStore = KeyValueStore<MemoryCollection>;

impl<C: KeyValueCollection> KeyValueStore<C> {
    pub fn new_with(collection: C) -> Self {
        Self { collection }
    }

    pub fn collection(&self) -> &C {
        &self.collection
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(bytes) = self.collection.get(key).await? else {
            debug!(key, "Store MISS");
            return Ok(None);
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                debug!(key, "Store HIT");
                Ok(Some(value))
            }
            Err(e) => {
                warn!(key, error = %e, "Discarding unreadable stored value");
                Ok(None)
            }
        }
    }

    async fn write<T: Serialize + ?Sized + Sync>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.collection.put(key, bytes).await?;
        debug!(key, "Store PUT");
        Ok(())
    }
}

#[async_trait]
impl<C: KeyValueCollection> PersistenceStore for KeyValueStore<C> {
    async fn save_rates(&self, snapshot: &RateSnapshot) -> Result<()> {
        self.write(RATES_KEY, snapshot).await
    }

    async fn load_rates(&self) -> Result<Option<RateSnapshot>> {
        self.read(RATES_KEY).await
    }

    async fn save_selected_currencies(&self, currencies: &[CurrencyCode]) -> Result<()> {
        self.write(SELECTED_CURRENCIES_KEY, currencies).await
    }

    async fn load_selected_currencies(&self) -> Result<Option<Vec<CurrencyCode>>> {
        self.read(SELECTED_CURRENCIES_KEY).await
    }

    async fn save_visible_count(&self, count: usize) -> Result<()> {
        self.write(VISIBLE_COUNT_KEY, &count).await
    }

    async fn load_visible_count(&self) -> Result<Option<usize>> {
        self.read(VISIBLE_COUNT_KEY).await
    }

    async fn save_history(&self, entries: &[HistoryEntry]) -> Result<()> {
        self.write(HISTORY_KEY, entries).await
    }

    async fn load_history(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.read(HISTORY_KEY).await?.unwrap_or_default())
    }
}
