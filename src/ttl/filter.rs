//! Expiration filter.
//!
//! One predicate serves both the read path and every compaction pass, so a
//! record's live/expired outcome does not depend on who asks. A record is
//! expired when `now - created_at > ttl`:
//!
//! - age equal to the TTL is still live
//! - a timestamp in the future (clock skew) is live
//! - with the TTL disabled everything is live and nothing is decoded

use std::sync::Arc;
use tracing::warn;

use super::clock::Clock;
use super::codec;
use super::types::Ttl;
use crate::engine::{CompactionFilter, Decision};
use crate::error::CorruptRecord;

/// Decides whether stamped records are still live.
pub struct ExpirationFilter {
    ttl: Ttl,
    clock: Arc<dyn Clock>,
    /// Time the filter was created; `now()` never reads earlier than this.
    floor: u64,
}

impl ExpirationFilter {
    /// Creates a filter whose time floor is the clock's current reading.
    pub fn new(ttl: Ttl, clock: Arc<dyn Clock>) -> Self {
        let floor = clock.now_secs();
        Self { ttl, clock, floor }
    }

    /// The configured TTL.
    pub fn ttl(&self) -> Ttl {
        self.ttl
    }

    /// Time the store was opened, in seconds since the Unix epoch.
    pub fn floor(&self) -> u64 {
        self.floor
    }

    /// Fresh clock reading, clamped to the open time.
    pub fn now(&self) -> u64 {
        self.clock.now_secs().max(self.floor)
    }

    /// Verdict for a record created at `created_at`, evaluated at `now`.
    pub fn decide(&self, created_at: u64, now: u64) -> Decision {
        match self.ttl.as_secs() {
            Some(ttl) if now.saturating_sub(created_at) > ttl => Decision::Remove,
            _ => Decision::Keep,
        }
    }

    /// Verdict for a stamped record at the current time.
    ///
    /// Only the timestamp prefix is read.
    ///
    /// # Errors
    ///
    /// Returns [`CorruptRecord`] if the record is too short to carry a
    /// timestamp, even when expiry is disabled.
    pub fn check(&self, stamped: &[u8]) -> Result<Decision, CorruptRecord> {
        let created_at = codec::created_at(stamped)?;
        Ok(self.decide(created_at, self.now()))
    }
}

impl CompactionFilter for ExpirationFilter {
    fn name(&self) -> &str {
        "ttl-expiration"
    }

    fn filter(&self, key: &[u8], value: &[u8]) -> Decision {
        if self.ttl.is_disabled() {
            return Decision::Keep;
        }

        match self.check(value) {
            Ok(decision) => decision,
            Err(err) => {
                // Keep what cannot be interpreted; reads still report it
                warn!(key_len = key.len(), error = %err, "Keeping corrupt record during compaction");
                Decision::Keep
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ttl::clock::ManualClock;
    use proptest::prelude::*;
    use std::time::Duration;

    const T0: u64 = 1_700_000_000;

    fn filter_at(ttl: u64, clock: &ManualClock) -> ExpirationFilter {
        ExpirationFilter::new(Ttl::from_secs(ttl), Arc::new(clock.clone()))
    }

    #[test]
    fn test_boundary_age_is_live() {
        let clock = ManualClock::new(T0);
        let filter = filter_at(2, &clock);

        assert_eq!(filter.decide(T0, T0 + 2), Decision::Keep);
        assert_eq!(filter.decide(T0, T0 + 3), Decision::Remove);
    }

    #[test]
    fn test_future_timestamp_is_live() {
        let clock = ManualClock::new(T0);
        let filter = filter_at(1, &clock);

        assert_eq!(filter.decide(T0 + 1_000, T0), Decision::Keep);
    }

    #[test]
    fn test_disabled_ttl_keeps_everything() {
        let clock = ManualClock::new(T0);
        let filter = filter_at(0, &clock);

        assert_eq!(filter.decide(0, u64::MAX), Decision::Keep);
        // Corrupt records are not even decoded
        assert_eq!(filter.filter(b"k", b"abc"), Decision::Keep);
    }

    #[test]
    fn test_now_never_reads_before_open_time() {
        let clock = ManualClock::new(T0);
        let filter = filter_at(10, &clock);
        assert_eq!(filter.floor(), T0);

        clock.set(T0 - 3_600);
        assert_eq!(filter.now(), T0);

        clock.set(T0 + 5);
        assert_eq!(filter.now(), T0 + 5);
    }

    #[test]
    fn test_check_reads_current_time() {
        let clock = ManualClock::new(T0);
        let filter = filter_at(2, &clock);
        let stamped = codec::encode(b"val1", T0);

        assert_eq!(filter.check(&stamped), Ok(Decision::Keep));
        clock.advance(Duration::from_secs(3));
        assert_eq!(filter.check(&stamped), Ok(Decision::Remove));
    }

    #[test]
    fn test_check_rejects_short_record() {
        let clock = ManualClock::new(T0);
        let filter = filter_at(0, &clock);

        assert_eq!(
            filter.check(b"abc"),
            Err(CorruptRecord::TooShort { len: 3 })
        );
    }

    #[test]
    fn test_compaction_keeps_corrupt_records() {
        let clock = ManualClock::new(T0);
        let filter = filter_at(1, &clock);
        clock.advance(Duration::from_secs(100));

        assert_eq!(filter.filter(b"k", b"short"), Decision::Keep);
        assert_eq!(
            filter.filter(b"k", &codec::encode(b"v", T0)),
            Decision::Remove
        );
    }

    proptest! {
        #[test]
        fn prop_remove_iff_strictly_older_than_ttl(
            ttl in 1u64..1_000_000,
            created_at in 0u64..4_000_000_000,
            now in 0u64..4_000_000_000,
        ) {
            let clock = ManualClock::new(0);
            let filter = filter_at(ttl, &clock);
            let expected = if now > created_at && now - created_at > ttl {
                Decision::Remove
            } else {
                Decision::Keep
            };
            prop_assert_eq!(filter.decide(created_at, now), expected);
        }
    }
}
