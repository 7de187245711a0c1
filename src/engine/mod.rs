//! Ordered key-value engines underneath the TTL layer.
//!
//! The TTL store never touches storage directly. It talks to a
//! [`StorageEngine`], which stores raw bytes in key order and runs a
//! registered [`CompactionFilter`] over every record it rewrites.
//!
//! - **RedbEngine**: Persistent storage with ACID guarantees (default)
//! - **MemoryEngine**: Ordered, non-persistent storage (testing/embedding)
//!
//! # Custom Engines
//!
//! ```ignore
//! use ttlkv::engine::StorageEngine;
//! use ttlkv::{Options, Ttl, TtlStore};
//!
//! struct SledEngine { /* ... */ }
//! impl StorageEngine for SledEngine { /* ... */ }
//!
//! let store = TtlStore::with_engine(SledEngine::new(), Ttl::from_secs(60), Options::default());
//! ```

mod backend;
mod memory;
mod range;
mod redb;

pub use backend::{
    BatchOp, CompactionFilter, CompactionStats, Decision, EngineOptions, StorageEngine, WriteBatch,
};
pub use memory::MemoryEngine;
pub use range::KeyRange;
pub use self::redb::RedbEngine;
