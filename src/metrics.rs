//! Store counters.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! embedding application installs a recorder.

use crate::engine::CompactionStats;

/// What started a compaction pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CompactionTrigger {
    Explicit,
    Background,
}

impl CompactionTrigger {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::Background => "background",
        }
    }
}

/// Record a read and how it resolved (`live`, `expired`, `missing`).
pub(crate) fn record_read(outcome: &'static str) {
    ::metrics::counter!("ttlkv_reads_total", "outcome" => outcome).increment(1);
}

/// Record stamped records written.
pub(crate) fn record_writes(records: u64) {
    ::metrics::counter!("ttlkv_writes_total").increment(records);
}

/// Record a finished compaction pass.
pub(crate) fn record_compaction(trigger: CompactionTrigger, stats: &CompactionStats) {
    ::metrics::counter!("ttlkv_compactions_total", "trigger" => trigger.as_str()).increment(1);
    ::metrics::counter!("ttlkv_compaction_dropped_total").increment(stats.dropped);
}
