//! Engine trait and the compaction hook.
//!
//! Defines the interface every ordered key-value engine must implement.
//! Engines see only opaque bytes; the TTL envelope is interpreted by the
//! registered [`CompactionFilter`], never by the engine itself.

use anyhow::Result;
use std::sync::Arc;

use super::range::KeyRange;

/// Verdict of a compaction filter for a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Carry the record into the rewritten output unchanged.
    Keep,
    /// Omit the record from the rewritten output.
    Remove,
}

/// Predicate an engine runs over every record during compaction.
///
/// Filters are shared between the engine and its owner and may be invoked
/// from any thread, so they must be `Send + Sync` and take `&self`.
pub trait CompactionFilter: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Decides whether `value` stored under `key` survives compaction.
    fn filter(&self, key: &[u8], value: &[u8]) -> Decision;
}

/// Outcome of a compaction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompactionStats {
    /// Records passed through the filter.
    pub examined: u64,
    /// Records the filter removed.
    pub dropped: u64,
    /// Whether the engine returned freed space to the file system.
    pub reclaimed: bool,
}

/// Options applied when an engine is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Create the database (and parent directories) when missing.
    pub create_if_missing: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            create_if_missing: true,
        }
    }
}

/// A single mutation inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

/// Ordered group of mutations applied atomically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a put.
    pub fn put(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> &mut Self {
        self.ops.push(BatchOp::Put {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Queues a delete.
    pub fn delete(&mut self, key: impl Into<Vec<u8>>) -> &mut Self {
        self.ops.push(BatchOp::Delete { key: key.into() });
        self
    }

    /// Number of queued mutations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns true if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Queued mutations in insertion order.
    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    /// Consumes the batch, yielding its mutations.
    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}

impl FromIterator<BatchOp> for WriteBatch {
    fn from_iter<I: IntoIterator<Item = BatchOp>>(iter: I) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}

/// Ordered key-value engine.
///
/// All engines must be thread-safe (`Send + Sync`). Reads and writes may be
/// issued concurrently; the engine is responsible for per-key consistency.
/// Releasing an engine is dropping it.
pub trait StorageEngine: Send + Sync + 'static {
    /// Short engine name used in logs.
    fn name(&self) -> &'static str;

    /// Retrieves the raw bytes stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Stores `value` under `key`, overwriting any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Removes `key`. Returns `Ok(true)` if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    fn delete(&self, key: &[u8]) -> Result<bool>;

    /// Applies every mutation in `batch` or none of them.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails. On error
    /// nothing from the batch is visible.
    fn write_batch(&self, batch: &WriteBatch) -> Result<()>;

    /// Returns raw records in `range`, in key order.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    fn scan(&self, range: &KeyRange) -> Result<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Installs the filter run by every subsequent compaction pass.
    ///
    /// Replaces any previously registered filter.
    fn register_compaction_filter(&self, filter: Arc<dyn CompactionFilter>);

    /// Rewrites `range` through the registered filter.
    ///
    /// Records the filter keeps are left byte-for-byte intact. Without a
    /// registered filter every record is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the rewrite fails. A failed pass leaves the range
    /// as it was before the call.
    fn compact_range(&self, range: &KeyRange) -> Result<CompactionStats>;
}
