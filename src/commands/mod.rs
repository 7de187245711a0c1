//! CLI command implementations for ttlkv.
//!
//! - [`records`] - Reading and writing records (put/get/inspect/delete/scan)
//! - [`compact`] - Explicit and background compaction (compact/maintain)

pub mod compact;
pub mod records;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use ttlkv::config::{Config, LogFormat, LoggingConfig};
use ttlkv::{Ttl, TtlStore};

/// Load configuration and apply command-line overrides.
///
/// Without `--config` the built-in defaults are used.
pub fn load_config(
    config_path: Option<&Path>,
    path: Option<PathBuf>,
    ttl_secs: Option<u64>,
) -> Result<Config> {
    let mut config = match config_path {
        Some(config_path) => Config::load_from(config_path)?,
        None => Config::default(),
    };

    if let Some(path) = path {
        config.store.path = Some(path);
    }
    if let Some(ttl_secs) = ttl_secs {
        config.store.ttl_secs = ttl_secs;
    }

    Ok(config)
}

/// Validate configuration, logging any warnings.
pub fn validate_config(config: &Config) -> Result<()> {
    let result = config.validate()?;
    for warning in &result.warnings {
        warn!("{warning}");
    }
    Ok(())
}

/// Initialize logging to stderr so stdout carries only command output.
///
/// `RUST_LOG` takes precedence over `logging.level`.
pub fn init_logging(logging: &LoggingConfig) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

/// Open the store described by `config`.
pub fn open_store(config: &Config) -> Result<TtlStore> {
    let path = config.resolved_path()?;
    let ttl: Ttl = config.ttl();

    let store = TtlStore::open(config.options(), ttl, &path)
        .with_context(|| format!("Failed to open store: {}", path.display()))?;

    info!(path = %path.display(), ttl = %ttl, "Store ready");
    Ok(store)
}

/// Render bytes for display: UTF-8 as-is, anything else as hex.
fn display_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => format!("0x{}", hex::encode(bytes)),
    }
}
