//! In-memory cache of mirrored records.
//!
//! One partition per resource, each an ordered map of record id to record.
//! Ordering follows the remote store's native key order (byte-wise string
//! order), never client write order.
//!
//! A partition has exactly one writer, the [`PartitionWriter`] handed out by
//! [`CacheStore::allocate`] to that resource's synchronizer. Everything else
//! reads through the [`CacheStore`]. Each record is replaced as a whole value
//! under the partition lock, so readers never see a half-applied record.

use mirrorstack_model::Record;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

type Partition = BTreeMap<String, Record>;

/// Read side of the cache, shared by every dispatcher operation.
#[derive(Debug, Default)]
pub struct CacheStore {
    partitions: HashMap<String, Arc<RwLock<Partition>>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates an empty partition for a resource and returns its only writer.
    /// Returns `None` if the resource already has a partition.
    pub fn allocate(&mut self, resource: &str) -> Option<PartitionWriter> {
        if self.partitions.contains_key(resource) {
            return None;
        }
        let partition = Arc::new(RwLock::new(Partition::new()));
        self.partitions
            .insert(resource.to_string(), Arc::clone(&partition));
        Some(PartitionWriter {
            resource: resource.to_string(),
            partition,
        })
    }

    /// Looks up one record.
    pub async fn get(&self, resource: &str, id: &str) -> Option<Record> {
        let partition = self.partitions.get(resource)?;
        partition.read().await.get(id).cloned()
    }

    /// All records of a resource in key order.
    pub async fn records(&self, resource: &str) -> Option<Vec<Record>> {
        let partition = self.partitions.get(resource)?;
        Some(partition.read().await.values().cloned().collect())
    }

    /// Record ids of a resource in key order.
    pub async fn ids(&self, resource: &str) -> Option<Vec<String>> {
        let partition = self.partitions.get(resource)?;
        Some(partition.read().await.keys().cloned().collect())
    }

    /// Number of cached records for a resource.
    pub async fn len(&self, resource: &str) -> Option<usize> {
        let partition = self.partitions.get(resource)?;
        Some(partition.read().await.len())
    }
}

/// Exclusive write access to one resource's partition.
#[derive(Debug)]
pub struct PartitionWriter {
    resource: String,
    partition: Arc<RwLock<Partition>>,
}

impl PartitionWriter {
    /// The resource this writer owns.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Inserts or replaces a record, returning the previous one.
    pub async fn upsert(&self, record: Record) -> Option<Record> {
        self.partition
            .write()
            .await
            .insert(record.id.clone(), record)
    }

    /// Removes a record by id.
    pub async fn remove(&self, id: &str) -> Option<Record> {
        self.partition.write().await.remove(id)
    }

    /// Inserts a batch of records under a single lock acquisition.
    pub async fn extend(&self, records: impl IntoIterator<Item = Record>) {
        let mut partition = self.partition.write().await;
        for record in records {
            partition.insert(record.id.clone(), record);
        }
    }
}
