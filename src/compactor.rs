//! Background compaction.
//!
//! Periodically runs a full-range compaction on a store so expired records
//! are reclaimed without an explicit call. Each pass goes through
//! [`TtlStore::compact`]'s code path and therefore the same expiration
//! filter as explicit compaction.
//!
//! The task holds only a weak reference: dropping or closing the store
//! stops it at the next tick.

use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::constants;
use crate::engine::KeyRange;
use crate::error::{Error, Result};
use crate::metrics::CompactionTrigger;
use crate::ttl::TtlStore;

/// Background compaction settings.
#[derive(Debug, Clone)]
pub struct CompactorConfig {
    /// Time between passes. The first pass runs one interval after spawn.
    pub interval: Duration,
}

impl Default for CompactorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(constants::DEFAULT_COMPACTION_INTERVAL_SECS),
        }
    }
}

/// Handle to a running background compactor.
#[derive(Debug)]
pub struct Compactor {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Compactor {
    /// Spawns the compactor on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the interval is zero.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(store: &Arc<TtlStore>, config: CompactorConfig) -> Result<Self> {
        if config.interval.is_zero() {
            return Err(Error::Config(
                "compaction interval must be greater than zero".to_string(),
            ));
        }

        let (shutdown, receiver) = watch::channel(false);
        let task = tokio::spawn(run(Arc::downgrade(store), config, receiver));

        Ok(Self { shutdown, task })
    }

    /// Returns true once the task has stopped.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the compactor, waiting for a pass in progress to finish.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Task`] if the task panicked.
    pub async fn shutdown(self) -> Result<()> {
        // The task may already be gone; that is fine
        let _ = self.shutdown.send(true);
        self.task.await?;
        Ok(())
    }
}

async fn run(store: Weak<TtlStore>, config: CompactorConfig, mut shutdown: watch::Receiver<bool>) {
    let mut interval = tokio::time::interval_at(Instant::now() + config.interval, config.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(interval = ?config.interval, "Starting background compactor");

    loop {
        tokio::select! {
            _ = interval.tick() => {},
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            },
        }

        let Some(store) = store.upgrade() else {
            debug!("Store dropped, stopping compactor");
            break;
        };
        if store.is_closed() {
            debug!("Store closed, stopping compactor");
            break;
        }

        let pass = tokio::task::spawn_blocking(move || {
            store.compact_with(&KeyRange::all(), CompactionTrigger::Background)
        })
        .await;

        match pass {
            Ok(Ok(stats)) => {
                if stats.dropped > 0 {
                    info!(
                        examined = stats.examined,
                        dropped = stats.dropped,
                        "Background compaction dropped expired records"
                    );
                }
            },
            Ok(Err(err)) if err.is_closed_handle() => {
                debug!("Store closed during compaction, stopping compactor");
                break;
            },
            Ok(Err(err)) => warn!(error = %err, "Background compaction failed"),
            Err(err) => warn!(error = %err, "Background compaction task failed"),
        }
    }

    info!("Background compactor stopped");
}
