//! Configuration for the ttlkv binary.
//!
//! Loaded from a TOML file; every section and field is optional:
//!
//! ```toml
//! [store]
//! path = "/var/lib/ttlkv/store.redb"
//! ttl_secs = 3600          # 0 disables expiry
//! create_if_missing = true
//!
//! [compaction]
//! interval_secs = 300      # 0 disables background compaction
//!
//! [logging]
//! level = "info"
//! format = "pretty"        # or "json"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants;
use crate::ttl::{Options, Ttl};

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Non-fatal warnings that should be logged but don't prevent operation.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Returns true if there are any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub store: StoreConfig,
    pub compaction: CompactionConfig,
    pub logging: LoggingConfig,
}

/// `[store]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Database file. Defaults to `<data dir>/ttlkv/store.redb`.
    pub path: Option<PathBuf>,
    /// Record lifetime in seconds; 0 disables expiry.
    pub ttl_secs: u64,
    pub create_if_missing: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            ttl_secs: constants::DEFAULT_TTL_SECS,
            create_if_missing: true,
        }
    }
}

/// `[compaction]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompactionConfig {
    /// Seconds between background passes; 0 disables them.
    pub interval_secs: u64,
}

impl Default for CompactionConfig {
    fn default() -> Self {
        Self {
            interval_secs: constants::DEFAULT_COMPACTION_INTERVAL_SECS,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: constants::DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Config {
    /// Load configuration from the specified path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read (IO error)
    /// - The file contains invalid TOML syntax
    /// - A field has an invalid type (a negative TTL included)
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration.
    ///
    /// Returns a `ValidationResult` containing any non-fatal warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails with one or more errors:
    /// - `store.path` is empty or points at a directory
    /// - `logging.level` is not a valid filter directive
    pub fn validate(&self) -> Result<ValidationResult> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        // 1. Store
        if let Some(path) = &self.store.path {
            if path.as_os_str().is_empty() {
                errors.push("store.path cannot be empty".to_string());
            } else if path.is_dir() {
                errors.push(format!(
                    "store.path is a directory: {}\n  \
                     Point it at a database file, e.g. {}",
                    path.display(),
                    path.join(constants::DEFAULT_DB_FILE).display()
                ));
            } else if !self.store.create_if_missing && !path.exists() {
                warnings.push(format!(
                    "Database does not exist and create_if_missing is false: {}",
                    path.display()
                ));
            }
        }

        if self.store.ttl_secs == 0 {
            warnings.push("store.ttl_secs is 0: records never expire".to_string());
        }

        // 2. Compaction
        if self.compaction.interval_secs == 0 && self.store.ttl_secs > 0 {
            warnings.push(
                "compaction.interval_secs is 0: expired records are only reclaimed \
                 by explicit compaction"
                    .to_string(),
            );
        }

        // 3. Logging
        if let Err(err) = tracing_subscriber::EnvFilter::try_new(&self.logging.level) {
            errors.push(format!(
                "Invalid logging.level '{}': {err}",
                self.logging.level
            ));
        }

        if !errors.is_empty() {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }

        Ok(ValidationResult { warnings })
    }

    /// The configured TTL.
    pub fn ttl(&self) -> Ttl {
        Ttl::from_secs(self.store.ttl_secs)
    }

    /// Store open options derived from the `[store]` section.
    pub fn options(&self) -> Options {
        Options::default().create_if_missing(self.store.create_if_missing)
    }

    /// Period between background compaction passes, if enabled.
    pub fn compaction_interval(&self) -> Option<Duration> {
        match self.compaction.interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Database path, falling back to the default data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is configured and the platform data
    /// directory cannot be determined.
    pub fn resolved_path(&self) -> Result<PathBuf> {
        match &self.store.path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join(constants::DEFAULT_DB_FILE)),
        }
    }
}

/// Get the ttlkv data directory.
///
/// Resolution order:
/// 1. `TTLKV_HOME` environment variable (if set)
/// 2. `<platform data dir>/ttlkv/`
///
/// # Errors
///
/// Returns an error if the platform data directory is unknown.
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var(constants::HOME_ENV)
        && !home.is_empty()
    {
        return Ok(PathBuf::from(home));
    }

    let base = dirs::data_dir().context("Failed to get data directory")?;
    Ok(base.join(constants::APP_DIR))
}
