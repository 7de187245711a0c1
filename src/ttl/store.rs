//! The TTL store.
//!
//! Wraps a [`StorageEngine`], stamps every write with the current time,
//! hides expired records from reads, and registers the expiration filter as
//! the engine's compaction filter so compaction physically drops them.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::codec;
use super::filter::ExpirationFilter;
use super::lifecycle::{Lifecycle, LifecycleState};
use super::types::{Lookup, Ttl};
use crate::engine::{
    BatchOp, CompactionFilter, CompactionStats, Decision, EngineOptions, KeyRange, MemoryEngine,
    RedbEngine, StorageEngine, WriteBatch,
};
use crate::error::{Error, Result};
use crate::metrics::{self, CompactionTrigger};

/// Options consumed by [`TtlStore::open`].
///
/// Ownership passes to the store: anything the options allocate (the clock)
/// lives exactly as long as the store does.
#[derive(Clone)]
pub struct Options {
    /// Create the database when missing.
    pub create_if_missing: bool,
    /// Time source for stamping and expiry checks.
    pub clock: Arc<dyn Clock>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            clock: Arc::new(SystemClock),
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("create_if_missing", &self.create_if_missing)
            .finish_non_exhaustive()
    }
}

impl Options {
    /// Sets whether a missing database is created.
    #[must_use]
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Replaces the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }
}

/// Key-value store whose records expire after a fixed TTL.
///
/// # Thread Safety
///
/// `TtlStore` is `Send + Sync`; share it with `Arc`. Closing is idempotent
/// and also happens when the store is dropped.
///
/// # Example
///
/// ```ignore
/// use ttlkv::{KeyRange, Options, Ttl, TtlStore};
///
/// let store = TtlStore::open(Options::default(), Ttl::from_secs(2), "/tmp/ttl.redb")?;
/// store.put(b"key1", b"val1")?;
/// assert_eq!(store.get(b"key1")?, Some(b"val1".to_vec()));
///
/// std::thread::sleep(std::time::Duration::from_secs(3));
/// store.compact(&KeyRange::all())?;
/// assert_eq!(store.get(b"key1")?, None);
/// store.close();
/// ```
pub struct TtlStore {
    engine: Lifecycle<Box<dyn StorageEngine>>,
    filter: Arc<ExpirationFilter>,
    path: Option<PathBuf>,
}

impl fmt::Debug for TtlStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlStore")
            .field("ttl", &self.ttl())
            .field("path", &self.path)
            .field("state", &self.engine.state())
            .finish()
    }
}

impl TtlStore {
    /// Opens a redb-backed store at `path` with the given TTL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Open`] if the database is missing and
    /// `create_if_missing` is off, is already open, or is not a valid
    /// database.
    pub fn open<P: AsRef<Path>>(options: Options, ttl: Ttl, path: P) -> Result<Self> {
        let path = path.as_ref();
        let engine_options = EngineOptions {
            create_if_missing: options.create_if_missing,
        };

        let engine =
            RedbEngine::open(path, &engine_options).map_err(|err| Error::open(path, err))?;

        let mut store = Self::with_engine(engine, ttl, options);
        store.path = Some(path.to_path_buf());

        info!(path = %path.display(), ttl = %ttl, "Opened TTL store");
        Ok(store)
    }

    /// Creates a store over a fresh in-memory engine.
    ///
    /// All data is lost when the store is closed.
    pub fn memory(ttl: Ttl) -> Self {
        Self::with_engine(MemoryEngine::new(), ttl, Options::default())
    }

    /// Creates a store over any engine.
    ///
    /// Registers the expiration filter with the engine; `create_if_missing`
    /// is ignored since the engine is already open.
    pub fn with_engine<E: StorageEngine>(engine: E, ttl: Ttl, options: Options) -> Self {
        let filter = Arc::new(ExpirationFilter::new(ttl, options.clock));
        let compaction_filter: Arc<dyn CompactionFilter> = filter.clone();
        engine.register_compaction_filter(compaction_filter);

        debug!(engine = engine.name(), ttl = %ttl, "Registered expiration filter");

        Self {
            engine: Lifecycle::new(Box::new(engine) as Box<dyn StorageEngine>),
            filter,
            path: None,
        }
    }

    /// The TTL fixed at open time.
    pub fn ttl(&self) -> Ttl {
        self.filter.ttl()
    }

    /// Database location for file-backed stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns true once the store has been closed.
    pub fn is_closed(&self) -> bool {
        self.engine.state() == LifecycleState::Closed
    }

    /// Stores `value` under `key`, stamped with the current time.
    ///
    /// Overwriting a key restarts its TTL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] if the engine rejects the write, or
    /// [`Error::ClosedHandle`] after close.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let stamped = codec::encode(value, self.filter.now());
        self.engine
            .with(|engine| engine.put(key, &stamped).map_err(Error::write))?;

        metrics::record_writes(1);
        Ok(())
    }

    /// Retrieves the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key doesn't exist or has expired, even if
    /// the expired record has not been compacted away yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Read`] if the engine fails or the stored record is
    /// corrupt, or [`Error::ClosedHandle`] after close.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.lookup(key).map(Lookup::into_value)
    }

    /// Looks `key` up, telling expired records apart from missing ones.
    ///
    /// # Errors
    ///
    /// Same as [`TtlStore::get`].
    pub fn lookup(&self, key: &[u8]) -> Result<Lookup> {
        let stamped = self
            .engine
            .with(|engine| engine.get(key).map_err(Error::read))?;

        let lookup = match stamped {
            None => Lookup::Missing,
            Some(stamped) => {
                let record = codec::decode(&stamped).inspect_err(|err| {
                    warn!(key_len = key.len(), error = %err, "Corrupt record on read");
                })?;

                match self.filter.decide(record.created_at, self.filter.now()) {
                    Decision::Keep => Lookup::Live {
                        value: record.value.to_vec(),
                        created_at: record.created_at,
                    },
                    Decision::Remove => Lookup::Expired {
                        created_at: record.created_at,
                    },
                }
            },
        };

        metrics::record_read(lookup.outcome());
        Ok(lookup)
    }

    /// Deletes `key`. Returns `Ok(true)` if a record (live or expired) was
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] if the engine fails, or
    /// [`Error::ClosedHandle`] after close.
    pub fn delete(&self, key: &[u8]) -> Result<bool> {
        self.engine
            .with(|engine| engine.delete(key).map_err(Error::write))
    }

    /// Applies a batch of puts and deletes atomically.
    ///
    /// Every put in the batch is stamped with the same time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] if the engine fails, in which case none of
    /// the batch is applied, or [`Error::ClosedHandle`] after close.
    pub fn write(&self, batch: WriteBatch) -> Result<()> {
        if batch.is_empty() {
            // An empty batch still fails once closed
            return self.engine.with(|_| Ok(()));
        }

        let now = self.filter.now();
        let mut puts = 0u64;
        let stamped: WriteBatch = batch
            .into_ops()
            .into_iter()
            .map(|op| match op {
                BatchOp::Put { key, value } => {
                    puts += 1;
                    BatchOp::Put {
                        key,
                        value: codec::encode(&value, now),
                    }
                },
                delete @ BatchOp::Delete { .. } => delete,
            })
            .collect();

        self.engine
            .with(|engine| engine.write_batch(&stamped).map_err(Error::write))?;

        metrics::record_writes(puts);
        Ok(())
    }

    /// Returns live records in `range`, in key order, without timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Read`] if the engine fails or any record in the
    /// range is corrupt, or [`Error::ClosedHandle`] after close.
    pub fn scan(&self, range: &KeyRange) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let records = self
            .engine
            .with(|engine| engine.scan(range).map_err(Error::read))?;

        let now = self.filter.now();
        let mut live = Vec::with_capacity(records.len());
        for (key, stamped) in records {
            let record = codec::decode(&stamped)?;
            if self.filter.decide(record.created_at, now) == Decision::Keep {
                live.push((key, record.value.to_vec()));
            }
        }

        Ok(live)
    }

    /// Rewrites `range` through the expiration filter.
    ///
    /// Expired records are dropped; live records keep their original bytes
    /// and creation time. An unbounded range also returns freed space to the
    /// file system where the engine supports it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Compaction`] if the engine fails, or
    /// [`Error::ClosedHandle`] after close.
    pub fn compact(&self, range: &KeyRange) -> Result<CompactionStats> {
        self.compact_with(range, CompactionTrigger::Explicit)
    }

    pub(crate) fn compact_with(
        &self,
        range: &KeyRange,
        trigger: CompactionTrigger,
    ) -> Result<CompactionStats> {
        let stats = self
            .engine
            .with(|engine| engine.compact_range(range).map_err(Error::compaction))?;

        debug!(
            trigger = trigger.as_str(),
            examined = stats.examined,
            dropped = stats.dropped,
            reclaimed = stats.reclaimed,
            "Compaction finished"
        );
        metrics::record_compaction(trigger, &stats);

        Ok(stats)
    }

    /// Closes the store, releasing the engine.
    ///
    /// Idempotent: only the first call releases anything. Waits for
    /// operations already running; later operations fail with
    /// [`Error::ClosedHandle`].
    pub fn close(&self) {
        if let Some(engine) = self.engine.release() {
            let name = engine.name();
            drop(engine);
            info!(engine = name, path = ?self.path, "Closed TTL store");
        }
    }
}

impl Drop for TtlStore {
    fn drop(&mut self) {
        self.close();
    }
}
