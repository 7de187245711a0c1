//! Shared defaults.

/// Default record lifetime: one hour.
pub const DEFAULT_TTL_SECS: u64 = 3_600;

/// Default period between background compaction passes.
pub const DEFAULT_COMPACTION_INTERVAL_SECS: u64 = 300;

/// Database file name inside the data directory.
pub const DEFAULT_DB_FILE: &str = "store.redb";

/// Directory under the platform data dir holding ttlkv data.
pub const APP_DIR: &str = "ttlkv";

/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "TTLKV_HOME";

/// Default log filter when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";
