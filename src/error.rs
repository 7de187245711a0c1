//! Error types for the TTL store.
//!
//! The taxonomy separates "data not present" (`Ok(None)` from reads) from
//! "data inaccessible": engine failures and structurally corrupt records are
//! both surfaced as [`Error::Read`], never masked as a missing key.

use std::path::PathBuf;

use crate::ttl::codec::TIMESTAMP_LEN;

/// Boxed source error carried by engine-backed variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Store errors with structured context.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The underlying engine could not be opened (missing path, lock held
    /// by another handle, unreadable on-disk format).
    #[error("failed to open store at {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    /// The engine rejected a write. Nothing was partially written.
    #[error("write failed: {0}")]
    Write(#[source] BoxError),

    /// A read could not be completed.
    #[error("read failed: {0}")]
    Read(#[from] ReadError),

    /// The handle was already closed.
    #[error("store handle is closed")]
    ClosedHandle,

    /// The engine failed while rewriting a key range.
    #[error("compaction failed: {0}")]
    Compaction(#[source] BoxError),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A blocking task backing an async wrapper panicked or was cancelled.
    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Why a read failed.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The engine failed to serve the read.
    #[error("storage engine error: {0}")]
    Engine(#[source] BoxError),

    /// The stored bytes are not a valid stamped record.
    #[error(transparent)]
    Corrupt(#[from] CorruptRecord),
}

/// Structural violation found while decoding a stamped record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CorruptRecord {
    /// The record cannot even hold the timestamp prefix.
    #[error(
        "corrupt record: {len} bytes is shorter than the {}-byte timestamp prefix",
        TIMESTAMP_LEN
    )]
    TooShort { len: usize },
}

impl From<CorruptRecord> for Error {
    fn from(err: CorruptRecord) -> Self {
        Self::Read(ReadError::Corrupt(err))
    }
}

impl Error {
    /// Create an open error for the given path.
    pub fn open(path: impl Into<PathBuf>, source: impl Into<BoxError>) -> Self {
        Self::Open {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Create a write error from an engine failure.
    pub fn write(source: impl Into<BoxError>) -> Self {
        Self::Write(source.into())
    }

    /// Create a read error from an engine failure.
    pub fn read(source: impl Into<BoxError>) -> Self {
        Self::Read(ReadError::Engine(source.into()))
    }

    /// Create a compaction error from an engine failure.
    pub fn compaction(source: impl Into<BoxError>) -> Self {
        Self::Compaction(source.into())
    }

    /// Returns true for read failures, including corrupt records.
    pub fn is_read_error(&self) -> bool {
        matches!(self, Self::Read(_))
    }

    /// Returns true if the read failed because the record is corrupt.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Read(ReadError::Corrupt(_)))
    }

    /// Returns true if the operation hit a closed handle.
    pub fn is_closed_handle(&self) -> bool {
        matches!(self, Self::ClosedHandle)
    }
}
