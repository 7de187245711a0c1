//! Types for the TTL store.

use std::fmt;
use std::time::Duration;

/// Maximum age of a record, fixed when the store is opened.
///
/// Zero is the "disabled" sentinel: records never expire and the filter is
/// bypassed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Ttl(u64);

impl Ttl {
    /// Records never expire.
    pub const DISABLED: Self = Self(0);

    /// TTL of `secs` seconds; `0` disables expiry.
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// TTL from a duration, truncated to whole seconds.
    pub const fn from_duration(duration: Duration) -> Self {
        Self(duration.as_secs())
    }

    /// Returns true if expiry is disabled.
    pub const fn is_disabled(self) -> bool {
        self.0 == 0
    }

    /// Seconds a record may age, or `None` when expiry is disabled.
    pub const fn as_secs(self) -> Option<u64> {
        if self.0 == 0 { None } else { Some(self.0) }
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_secs() {
            Some(secs) => write!(f, "{secs}s"),
            None => f.write_str("disabled"),
        }
    }
}

/// Result of looking a key up, keeping expired and missing apart.
///
/// [`TtlStore::get`](super::TtlStore::get) collapses both absent cases into
/// `None`; `lookup` is for callers that need to know which one it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The record is live.
    Live { value: Vec<u8>, created_at: u64 },
    /// The record is still stored but older than the TTL.
    Expired { created_at: u64 },
    /// Nothing is stored under the key.
    Missing,
}

impl Lookup {
    /// The live value, if any.
    pub fn into_value(self) -> Option<Vec<u8>> {
        match self {
            Self::Live { value, .. } => Some(value),
            Self::Expired { .. } | Self::Missing => None,
        }
    }

    /// Creation time of the stored record, live or expired.
    pub fn created_at(&self) -> Option<u64> {
        match self {
            Self::Live { created_at, .. } | Self::Expired { created_at } => Some(*created_at),
            Self::Missing => None,
        }
    }

    /// Returns true for a live record.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live { .. })
    }

    /// Label used in logs and metrics.
    pub(crate) fn outcome(&self) -> &'static str {
        match self {
            Self::Live { .. } => "live",
            Self::Expired { .. } => "expired",
            Self::Missing => "missing",
        }
    }
}
