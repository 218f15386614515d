//! TOML-based engine configuration.
//!
//! Controls the escalation timings:
//! - Level-cycle duration (how long each urgency tier lasts)
//! - Beep interval within a cycle
//! - Single-beep retry backoff and settle delay
//!
//! All fields default to the stock alarm behavior: 20 s cycles with a
//! beep every 3 s.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Engine timing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationConfig {
    /// Duration of one level-cycle in milliseconds.
    #[serde(default = "default_level_duration_ms")]
    pub level_duration_ms: u64,
    /// Interval between beep attempts in milliseconds.
    #[serde(default = "default_beep_interval_ms")]
    pub beep_interval_ms: u64,
    /// Backoff before retrying a single beep whose sound is still loading.
    #[serde(default = "default_single_beep_retry_ms")]
    pub single_beep_retry_ms: u64,
    /// Settle delay between a single beep and its teardown.
    #[serde(default = "default_single_beep_settle_ms")]
    pub single_beep_settle_ms: u64,
}

fn default_level_duration_ms() -> u64 {
    20_000
}
fn default_beep_interval_ms() -> u64 {
    3_000
}
fn default_single_beep_retry_ms() -> u64 {
    300
}
fn default_single_beep_settle_ms() -> u64 {
    500
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            level_duration_ms: default_level_duration_ms(),
            beep_interval_ms: default_beep_interval_ms(),
            single_beep_retry_ms: default_single_beep_retry_ms(),
            single_beep_settle_ms: default_single_beep_settle_ms(),
        }
    }
}

impl EscalationConfig {
    /// Parse from a TOML string and validate.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(s).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&raw)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.beep_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "beep_interval_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        if self.level_duration_ms < self.beep_interval_ms {
            return Err(ConfigError::InvalidValue {
                key: "level_duration_ms".into(),
                message: "must be at least one beep interval".into(),
            });
        }
        Ok(())
    }

    // ── Duration accessors ───────────────────────────────────────────

    pub fn level_duration(&self) -> Duration {
        Duration::from_millis(self.level_duration_ms)
    }

    pub fn beep_interval(&self) -> Duration {
        Duration::from_millis(self.beep_interval_ms)
    }

    pub fn single_beep_retry(&self) -> Duration {
        Duration::from_millis(self.single_beep_retry_ms)
    }

    pub fn single_beep_settle(&self) -> Duration {
        Duration::from_millis(self.single_beep_settle_ms)
    }
}
