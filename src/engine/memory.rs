//! In-memory ordered engine.
//!
//! Keeps records in a `BTreeMap` behind a `parking_lot::RwLock`, so scans
//! and compaction walk keys in the same bytewise order as the redb engine.
//! Ideal for testing, development, and embedded use cases.

use anyhow::Result;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use super::backend::{
    BatchOp, CompactionFilter, CompactionStats, Decision, StorageEngine, WriteBatch,
};
use super::range::KeyRange;

#[derive(Default)]
struct Inner {
    records: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
    filter: RwLock<Option<Arc<dyn CompactionFilter>>>,
}

/// In-memory ordered engine.
///
/// All data is lost when the last clone is dropped.
///
/// # Thread Safety
///
/// `MemoryEngine` is `Clone`; clones share the same records, which lets a
/// test keep a handle for inspecting raw bytes after handing the engine to
/// a store.
///
/// # Example
///
/// ```ignore
/// use ttlkv::engine::{MemoryEngine, StorageEngine};
///
/// let engine = MemoryEngine::new();
/// engine.put(b"key", b"raw bytes")?;
/// ```
#[derive(Clone, Default)]
pub struct MemoryEngine {
    inner: Arc<Inner>,
}

impl MemoryEngine {
    /// Creates a new empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of physically stored records (including expired).
    pub fn len(&self) -> usize {
        self.inner.records.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.inner.records.read().is_empty()
    }
}

impl StorageEngine for MemoryEngine {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.inner.records.read().get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.inner
            .records
            .write()
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<bool> {
        Ok(self.inner.records.write().remove(key).is_some())
    }

    fn write_batch(&self, batch: &WriteBatch) -> Result<()> {
        // One write guard for the whole batch keeps it atomic for readers
        let mut records = self.inner.records.write();
        for op in batch.ops() {
            match op {
                BatchOp::Put { key, value } => {
                    records.insert(key.clone(), value.clone());
                },
                BatchOp::Delete { key } => {
                    records.remove(key);
                },
            }
        }
        Ok(())
    }

    fn scan(&self, range: &KeyRange) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        if range.is_empty() {
            return Ok(Vec::new());
        }

        let records = self.inner.records.read();
        Ok(records
            .range::<[u8], _>(range.bounds())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn register_compaction_filter(&self, filter: Arc<dyn CompactionFilter>) {
        debug!(engine = "memory", filter = filter.name(), "Registered compaction filter");
        *self.inner.filter.write() = Some(filter);
    }

    fn compact_range(&self, range: &KeyRange) -> Result<CompactionStats> {
        let mut stats = CompactionStats::default();
        if range.is_empty() {
            return Ok(stats);
        }

        let filter = self.inner.filter.read().clone();
        let mut records = self.inner.records.write();

        let mut doomed = Vec::new();
        for (key, value) in records.range::<[u8], _>(range.bounds()) {
            stats.examined += 1;
            if let Some(filter) = &filter
                && filter.filter(key, value) == Decision::Remove
            {
                doomed.push(key.clone());
            }
        }

        for key in &doomed {
            records.remove(key);
        }
        stats.dropped = doomed.len() as u64;
        // Removed entries are freed immediately
        stats.reclaimed = stats.dropped > 0;

        Ok(stats)
    }
}
