//! # Engine Configuration
//!
//! Unified configuration for every subsystem, loadable from TOML.
//!
//! ```toml
//! [store]
//! creation_limit = 10
//! creation_window_secs = 3600
//!
//! [query]
//! default_radius_m = 200
//! demo_enabled = true
//!
//! [runtime]
//! purge_interval_secs = 60
//! ```
//!
//! Every section and field is optional and falls back to its default.

use ps_01_signal_store::StoreConfig;
use ps_02_signal_lifecycle::LifecycleConfig;
use ps_03_proximity_query::QueryConfig;
use ps_04_realtime_reconciler::ReconcilerConfig;
use ps_05_reveal_gate::RevealConfig;
use serde::{Deserialize, Serialize};
use shared_types::validate_radius;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub store: StoreConfig,
    pub lifecycle: LifecycleConfig,
    pub query: QueryConfig,
    pub reconciler: ReconcilerConfig,
    pub reveal: RevealConfig,
    pub bus: BusConfig,
    pub runtime: RuntimeConfig,
}

/// Realtime event bus settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Buffered events per subscriber before it starts lagging.
    pub channel_capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: shared_bus::DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Process-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Interval of the server-side expired-signal purge, in seconds.
    /// Zero disables the purge task.
    pub purge_interval_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            purge_interval_secs: 60,
        }
    }
}

impl RuntimeConfig {
    #[must_use]
    pub fn purge_interval(&self) -> Option<Duration> {
        (self.purge_interval_secs > 0).then(|| Duration::from_secs(self.purge_interval_secs))
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("Failed to read {path}: {error}")]
    Io { path: String, error: String },

    /// TOML parsing error.
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// Parsed but unusable.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Fast timings for tests.
    pub fn for_testing() -> Self {
        Self {
            store: StoreConfig::default(),
            lifecycle: LifecycleConfig::for_testing(),
            query: QueryConfig::for_testing(),
            reconciler: ReconcilerConfig::for_testing(),
            reveal: RevealConfig::for_testing(),
            bus: BusConfig::default(),
            runtime: RuntimeConfig {
                purge_interval_secs: 0,
            },
        }
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_radius(self.query.default_radius_m)
            .map_err(|e| ConfigError::Invalid(format!("query.default_radius_m: {e}")))?;
        if self.lifecycle.signal_ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "lifecycle.signal_ttl_secs must be positive".to_string(),
            ));
        }
        if self.store.creation_limit == 0 || self.store.reveal_cap_per_pair == 0 {
            return Err(ConfigError::Invalid(
                "store limits must allow at least one operation".to_string(),
            ));
        }
        if self.bus.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "bus.channel_capacity must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
