use super::{KeyValueCollection, KeyValueStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PARTITION_NAME: &str = "fxpad";

/// A collection backed by a `fjall` partition on disk.
pub struct DiskCollection {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskCollection {
    pub fn open(db_path: &Path) -> Result<Self> {
        std::fs::create_dir_all(db_path)
            .with_context(|| format!("Failed to create data directory: {}", db_path.display()))?;

        let keyspace = fjall::Config::new(db_path.join("fjall_db"))
            .open()
            .context("Failed to open keyspace")?;
        let partition = keyspace
            .open_partition(PARTITION_NAME, PartitionCreateOptions::default())
            .context("Failed to open partition")?;
        debug!("Opened disk store at {}", db_path.display());

        Ok(Self {
            keyspace,
            partition,
        })
    }
}

#[async_trait]
impl KeyValueCollection for DiskCollection {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self.partition.get(key)?;
        Ok(value.map(|slice| slice.to_vec()))
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.partition.insert(key, value)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}

impl KeyValueStore<DiskCollection> {
    pub fn open(db_path: &Path) -> Result<Self> {
        Ok(Self::new_with(DiskCollection::open(db_path)?))
    }
}
