//! Compaction commands.
//!
//! - `ttlkv compact [--begin K] [--end K]` - Drop expired records now
//! - `ttlkv maintain` - Run the background compactor until Ctrl-C

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use ttlkv::compactor::{Compactor, CompactorConfig};
use ttlkv::{KeyRange, TtlStore};

/// Execute `compact`. Both ends of the range are inclusive.
pub fn compact(store: &TtlStore, begin: Option<&str>, end: Option<&str>) -> Result<()> {
    let range = KeyRange::new(begin.map(str::as_bytes), end.map(str::as_bytes));
    let stats = store.compact(&range)?;

    println!(
        "Compacted: examined {}, dropped {} expired{}",
        stats.examined,
        stats.dropped,
        if stats.reclaimed {
            ", space reclaimed"
        } else {
            ""
        }
    );
    Ok(())
}

/// Execute `maintain`.
pub async fn maintain(store: TtlStore, interval: Option<Duration>) -> Result<()> {
    let Some(interval) = interval else {
        anyhow::bail!(
            "Background compaction is disabled (compaction.interval_secs = 0)\n  \
             Set a positive interval in the config file"
        );
    };

    let store = Arc::new(store);
    let compactor = Compactor::spawn(&store, CompactorConfig { interval })?;

    info!(interval = ?interval, "Maintaining store, press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    info!("Shutting down");
    compactor.shutdown().await?;
    store.close();
    Ok(())
}
