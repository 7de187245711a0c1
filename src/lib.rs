//! ttlkv: a time-to-live layer over an embedded ordered key-value store.
//!
//! Values are stamped with their creation time on write. Reads treat records
//! older than the store's TTL as absent, and compaction (explicit or
//! background) drops them physically through the same expiration filter.
//!
//! ```ignore
//! use ttlkv::{KeyRange, Options, Ttl, TtlStore};
//!
//! let store = TtlStore::open(Options::default(), Ttl::from_secs(2), "./data/store.redb")?;
//! store.put(b"key1", b"val1")?;
//! assert_eq!(store.get(b"key1")?, Some(b"val1".to_vec()));
//!
//! std::thread::sleep(std::time::Duration::from_secs(3));
//! store.compact(&KeyRange::all())?;
//! assert_eq!(store.get(b"key1")?, None);
//! ```

pub mod compactor;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
mod metrics;
pub mod ttl;

pub use engine::{KeyRange, WriteBatch};
pub use error::{CorruptRecord, Error, ReadError, Result};
pub use ttl::{Clock, Lookup, ManualClock, Options, SystemClock, Ttl, TtlStore};
