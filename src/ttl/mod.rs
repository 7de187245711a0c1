//! TTL layer over an ordered key-value engine.
//!
//! Every value is stored behind a fixed-width creation timestamp (see
//! [`codec`]). Reads hide records older than the store's TTL, and
//! compaction drops them physically through the same [`ExpirationFilter`].
//!
//! # Example
//!
//! ```ignore
//! use ttlkv::{KeyRange, Options, Ttl, TtlStore};
//!
//! let store = TtlStore::open(Options::default(), Ttl::from_secs(60), "./data/store.redb")?;
//! store.put(b"session", b"token")?;
//! store.compact(&KeyRange::all())?;
//! ```

mod async_ops;
mod clock;
pub mod codec;
mod filter;
mod lifecycle;
mod store;
mod types;

#[cfg(test)]
mod tests;

pub use clock::{Clock, ManualClock, SystemClock};
pub use filter::ExpirationFilter;
pub use lifecycle::{Lifecycle, LifecycleState};
pub use store::{Options, TtlStore};
pub use types::{Lookup, Ttl};
