//! Async wrappers for store operations.
//!
//! These wrap the synchronous operations in `spawn_blocking` so engine I/O
//! never blocks the async runtime. The store must be shared through an
//! `Arc`, since the blocking task outlives the borrow.

use std::sync::Arc;

use super::store::TtlStore;
use super::types::Lookup;
use crate::engine::{CompactionStats, KeyRange};
use crate::error::Result;

impl TtlStore {
    /// Async version of [`TtlStore::put`].
    pub async fn put_async(self: &Arc<Self>, key: Vec<u8>, value: Vec<u8>) -> Result<()> {
        let store = Arc::clone(self);
        tokio::task::spawn_blocking(move || store.put(&key, &value)).await?
    }

    /// Async version of [`TtlStore::get`].
    pub async fn get_async(self: &Arc<Self>, key: Vec<u8>) -> Result<Option<Vec<u8>>> {
        let store = Arc::clone(self);
        tokio::task::spawn_blocking(move || store.get(&key)).await?
    }

    /// Async version of [`TtlStore::lookup`].
    pub async fn lookup_async(self: &Arc<Self>, key: Vec<u8>) -> Result<Lookup> {
        let store = Arc::clone(self);
        tokio::task::spawn_blocking(move || store.lookup(&key)).await?
    }

    /// Async version of [`TtlStore::delete`].
    pub async fn delete_async(self: &Arc<Self>, key: Vec<u8>) -> Result<bool> {
        let store = Arc::clone(self);
        tokio::task::spawn_blocking(move || store.delete(&key)).await?
    }

    /// Async version of [`TtlStore::compact`].
    pub async fn compact_async(self: &Arc<Self>, range: KeyRange) -> Result<CompactionStats> {
        let store = Arc::clone(self);
        tokio::task::spawn_blocking(move || store.compact(&range)).await?
    }
}
