//! Redb-backed engine.
//!
//! Provides persistent ordered storage using redb with ACID guarantees.
//! Compaction runs the registered filter inside a single write transaction,
//! so a failed pass leaves the range untouched.

use anyhow::{Context, Result};
use parking_lot::RwLock;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::backend::{
    BatchOp, CompactionFilter, CompactionStats, Decision, EngineOptions, StorageEngine, WriteBatch,
};
use super::range::KeyRange;

/// Table holding stamped records keyed by raw key bytes.
const RECORDS: TableDefinition<'static, &'static [u8], &'static [u8]> =
    TableDefinition::new("records");

/// Redb-backed engine.
///
/// Suitable for production use where durability is required.
///
/// # Thread Safety
///
/// The database sits behind a `RwLock`: record operations share the read
/// side, while returning freed pages to the file system (`Database::compact`)
/// needs exclusive access.
pub struct RedbEngine {
    db: RwLock<Database>,
    path: PathBuf,
    filter: RwLock<Option<Arc<dyn CompactionFilter>>>,
}

impl RedbEngine {
    /// Opens a redb database at the given path.
    ///
    /// With `create_if_missing`, parent directories and the database file
    /// are created as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file is missing and `create_if_missing` is false
    /// - The database is already open (by this or another process)
    /// - The file is not a valid redb database
    /// - The initialization transaction fails to begin or commit
    pub fn open<P: AsRef<Path>>(path: P, options: &EngineOptions) -> Result<Self> {
        let path = path.as_ref();

        let db = if options.create_if_missing {
            // Ensure parent directory exists before opening database
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create store directory: {}", parent.display())
                })?;
            }
            Database::create(path)
                .with_context(|| format!("Failed to open database: {}", path.display()))?
        } else {
            if !path.exists() {
                anyhow::bail!(
                    "Database does not exist: {} (create_if_missing is disabled)",
                    path.display()
                );
            }
            Database::open(path)
                .with_context(|| format!("Failed to open database: {}", path.display()))?
        };

        // Initialize table on first open to ensure it exists for reads
        let write_txn = db
            .begin_write()
            .context("Failed to begin initialization transaction")?;
        {
            let _table = write_txn
                .open_table(RECORDS)
                .context("Failed to initialize record table")?;
        }
        write_txn
            .commit()
            .context("Failed to commit initialization transaction")?;

        debug!(path = %path.display(), "Opened redb engine");

        Ok(Self {
            db: RwLock::new(db),
            path: path.to_path_buf(),
            filter: RwLock::new(None),
        })
    }

    /// Location of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn apply(
        op: &BatchOp,
        table: &mut redb::Table<'_, &'static [u8], &'static [u8]>,
    ) -> Result<()> {
        match op {
            BatchOp::Put { key, value } => {
                table
                    .insert(key.as_slice(), value.as_slice())
                    .context("Failed to insert record")?;
            },
            BatchOp::Delete { key } => {
                table
                    .remove(key.as_slice())
                    .context("Failed to remove record")?;
            },
        }
        Ok(())
    }
}

impl StorageEngine for RedbEngine {
    fn name(&self) -> &'static str {
        "redb"
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let db = self.db.read();
        let read_txn = db
            .begin_read()
            .context("Failed to begin read transaction")?;

        let table = read_txn
            .open_table(RECORDS)
            .context("Failed to open record table")?;

        let value = table.get(key).context("Failed to read record")?;
        Ok(value.map(|guard| guard.value().to_vec()))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let db = self.db.read();
        let write_txn = db
            .begin_write()
            .context("Failed to begin write transaction")?;

        {
            let mut table = write_txn
                .open_table(RECORDS)
                .context("Failed to open record table")?;

            table
                .insert(key, value)
                .context("Failed to insert record")?;
        }

        write_txn
            .commit()
            .context("Failed to commit put transaction")?;

        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<bool> {
        let db = self.db.read();
        let write_txn = db
            .begin_write()
            .context("Failed to begin write transaction")?;

        let removed = {
            let mut table = write_txn
                .open_table(RECORDS)
                .context("Failed to open record table")?;

            table
                .remove(key)
                .context("Failed to remove record")?
                .is_some()
        };

        write_txn
            .commit()
            .context("Failed to commit delete transaction")?;

        Ok(removed)
    }

    fn write_batch(&self, batch: &WriteBatch) -> Result<()> {
        let db = self.db.read();
        let write_txn = db
            .begin_write()
            .context("Failed to begin batch transaction")?;

        {
            let mut table = write_txn
                .open_table(RECORDS)
                .context("Failed to open record table")?;

            for op in batch.ops() {
                Self::apply(op, &mut table)?;
            }
        }

        // Dropping an uncommitted transaction aborts it, so an early return
        // above leaves nothing behind
        write_txn
            .commit()
            .context("Failed to commit batch transaction")?;

        Ok(())
    }

    fn scan(&self, range: &KeyRange) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        if range.is_empty() {
            return Ok(Vec::new());
        }

        let db = self.db.read();
        let read_txn = db
            .begin_read()
            .context("Failed to begin read transaction")?;

        let table = read_txn
            .open_table(RECORDS)
            .context("Failed to open record table")?;

        let mut records = Vec::new();
        for item in table
            .range::<&[u8]>(range.bounds())
            .context("Failed to iterate record table")?
        {
            let (key, value) = item.context("Failed to read record")?;
            records.push((key.value().to_vec(), value.value().to_vec()));
        }

        Ok(records)
    }

    fn register_compaction_filter(&self, filter: Arc<dyn CompactionFilter>) {
        debug!(engine = "redb", filter = filter.name(), "Registered compaction filter");
        *self.filter.write() = Some(filter);
    }

    fn compact_range(&self, range: &KeyRange) -> Result<CompactionStats> {
        let mut stats = CompactionStats::default();
        if range.is_empty() {
            return Ok(stats);
        }

        let filter = self.filter.read().clone();

        {
            let db = self.db.read();
            let write_txn = db
                .begin_write()
                .context("Failed to begin compaction transaction")?;

            {
                let mut table = write_txn
                    .open_table(RECORDS)
                    .context("Failed to open record table")?;

                let mut doomed = Vec::new();
                for item in table
                    .range::<&[u8]>(range.bounds())
                    .context("Failed to iterate record table")?
                {
                    let (key, value) = item.context("Failed to read record")?;
                    stats.examined += 1;
                    if let Some(filter) = &filter
                        && filter.filter(key.value(), value.value()) == Decision::Remove
                    {
                        doomed.push(key.value().to_vec());
                    }
                }

                for key in &doomed {
                    table
                        .remove(key.as_slice())
                        .context("Failed to remove filtered record")?;
                }
                stats.dropped = doomed.len() as u64;
            }

            write_txn
                .commit()
                .context("Failed to commit compaction transaction")?;
        }

        // Returning pages to the file system needs exclusive access, so only
        // full-range passes pay for it
        if range.is_unbounded() {
            stats.reclaimed = self
                .db
                .write()
                .compact()
                .context("Failed to compact database file")?;
        }

        if stats.dropped > 0 {
            info!(
                path = %self.path.display(),
                examined = stats.examined,
                dropped = stats.dropped,
                reclaimed = stats.reclaimed,
                "Compaction removed records"
            );
        }

        Ok(stats)
    }
}
