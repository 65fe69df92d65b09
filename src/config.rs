//! Configuration management.
//!
//! Settings are loaded with the `config` crate from a TOML file under
//! `config/` (default `config/default.toml`) and deserialized into typed
//! structs. [`Settings::validate`] catches values that parse but are
//! logically invalid before anything is wired up.

use crate::error::{AppResult, RfidError};
use config::Config;
use serde::Deserialize;

/// Top-level application settings.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Log filter passed to the logger at startup.
    pub log_level: String,
    /// Ingestion pipeline knobs.
    pub ingestion: IngestionSettings,
    /// Persistence knobs.
    pub storage: StorageSettings,
    /// Mock reader knobs (demo binary and tests).
    #[serde(default)]
    pub reader: ReaderSettings,
}

/// Knobs for the batching/deduplication actor.
///
/// The command queue is bounded; `enqueue` drops the newest observation when
/// it is full. That drop-newest policy is fixed, only the capacity varies.
#[derive(Debug, Deserialize, Clone)]
pub struct IngestionSettings {
    /// Flush when this many unique observations are pending.
    pub batch_size: usize,
    /// Flush when the pending buffer has been idle this long.
    pub batch_timeout_ms: u64,
    /// Command queue capacity shared by all producers.
    pub queue_capacity: usize,
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self {
            batch_size: 200,
            batch_timeout_ms: 250,
            queue_capacity: 1024,
        }
    }
}

impl IngestionSettings {
    /// The time-trigger threshold as a [`std::time::Duration`].
    pub fn batch_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.batch_timeout_ms)
    }
}

/// Persistence settings.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    /// Directory batch files are written under.
    pub default_path: String,
    /// Storage backend selector, e.g. `"csv"`.
    pub default_format: String,
}

/// Mock reader settings for the demo binary.
#[derive(Debug, Deserialize, Clone)]
pub struct ReaderSettings {
    /// Emission rate in reads per second.
    pub reads_per_sec: u32,
    /// Fraction of reads that repeat an earlier identifier, 0.0..=1.0.
    pub duplicate_ratio: f64,
    /// Universe of distinct tags the mock reader draws from.
    pub tag_population: usize,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            reads_per_sec: 400,
            duplicate_ratio: 0.6,
            tag_population: 500,
        }
    }
}

impl Settings {
    /// Loads settings from `config/<name>.toml` (default `config/default`).
    pub fn new(config_name: Option<&str>) -> AppResult<Self> {
        let config_path = format!("config/{}", config_name.unwrap_or("default"));
        let s = Config::builder()
            .add_source(config::File::with_name(&config_path))
            .build()
            .map_err(RfidError::Config)?;

        let settings: Settings = s.try_deserialize().map_err(RfidError::Config)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks semantic constraints the deserializer cannot express.
    pub fn validate(&self) -> AppResult<()> {
        if self.ingestion.batch_size == 0 {
            return Err(RfidError::Configuration(
                "ingestion.batch_size must be greater than 0".into(),
            ));
        }
        if self.ingestion.batch_timeout_ms == 0 {
            return Err(RfidError::Configuration(
                "ingestion.batch_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.ingestion.queue_capacity == 0 {
            return Err(RfidError::Configuration(
                "ingestion.queue_capacity must be greater than 0".into(),
            ));
        }
        if self.storage.default_path.is_empty() {
            return Err(RfidError::Configuration(
                "storage.default_path cannot be empty".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.reader.duplicate_ratio) {
            return Err(RfidError::Configuration(
                "reader.duplicate_ratio must be within 0.0..=1.0".into(),
            ));
        }
        Ok(())
    }
}
