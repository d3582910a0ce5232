// Effitherm - Machine efficiency monitoring
// Copyright (c) 2025 Effitherm Engineering
//
// Licensed under AGPL-3.0. See LICENSE file for details.

//! Monitor configuration.

use crate::error::ConfigError;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Master configuration for the monitoring pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Temperature source settings.
    pub source: SourceConfig,

    /// Acquisition retry policy.
    pub retry: RetryPolicy,

    /// Alert thresholds and debouncing.
    pub alert: AlertConfig,

    /// Persistence store settings.
    pub storage: StorageConfig,

    /// Scheduler settings.
    pub poll: PollConfig,
}

impl MonitorConfig {
    /// Load configuration from a JSON file.
    ///
    /// Missing sections fall back to their defaults, so a config file may
    /// contain only the keys it overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Weather source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Endpoint serving current conditions.
    pub base_url: String,

    /// Location query sent as the `q` parameter.
    pub location: String,

    /// API key sent as the `appid` parameter.
    pub api_key: String,

    /// Unit system sent as the `units` parameter.
    pub units: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org/data/2.5/weather".to_string(),
            location: String::new(),
            api_key: String::new(),
            units: "metric".to_string(),
        }
    }
}

/// Alert thresholds and debouncing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Temperature at or above which an alert condition holds (°C).
    pub temperature_critical: f64,

    /// Efficiency at or below which an alert condition holds (%).
    pub efficiency_critical: f64,

    /// Minimum time between two emitted notifications (ms).
    pub debounce_ms: u64,

    /// Emit only threshold-crossing notifications, suppressing routine
    /// status updates.
    pub critical_only: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            temperature_critical: 20.0,
            efficiency_critical: 70.0,
            debounce_ms: 120_000, // 2 minutes
            critical_only: false,
        }
    }
}

impl AlertConfig {
    /// Debounce interval as a duration.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Persistence store settings for the REST gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Store base URL; empty means no remote store is configured.
    pub base_url: String,

    /// Store API key, sent as both `apikey` and bearer token.
    pub api_key: String,
}

impl StorageConfig {
    /// Whether a remote store has been configured.
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty()
    }
}

/// Scheduler settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Interval between pipeline ticks (ms).
    pub interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 600_000, // 10 minutes
        }
    }
}

impl PollConfig {
    /// Preset for cheap environments that can afford frequent polling.
    pub const FAST_INTERVAL_MS: u64 = 60_000;

    /// Polling interval as a duration.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = MonitorConfig::default();
        assert_eq!(config.alert.temperature_critical, 20.0);
        assert_eq!(config.alert.efficiency_critical, 70.0);
        assert_eq!(config.alert.debounce_ms, 120_000);
        assert!(!config.alert.critical_only);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.poll.interval_ms, 600_000);
        assert_eq!(config.source.units, "metric");
        assert!(!config.storage.is_configured());
    }

    #[test]
    fn test_config_serialization() {
        let config = MonitorConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: MonitorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.alert.debounce_ms, parsed.alert.debounce_ms);
        assert_eq!(config.retry.max_attempts, parsed.retry.max_attempts);
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{ "alert": {{ "debounce_ms": 300000 }}, "poll": {{ "interval_ms": 60000 }} }}"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = MonitorConfig::load(file.path()).unwrap();
        assert_eq!(config.alert.debounce_ms, 300_000);
        // Untouched keys keep their defaults.
        assert_eq!(config.alert.temperature_critical, 20.0);
        assert_eq!(config.poll.interval_ms, 60_000);
        assert_eq!(config.retry.max_attempts, 5);
    }

    #[test]
    fn test_load_missing_file() {
        let err = MonitorConfig::load("/nonexistent/effitherm.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();
        file.flush().unwrap();

        let err = MonitorConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_durations() {
        let config = MonitorConfig::default();
        assert_eq!(config.alert.debounce(), Duration::from_secs(120));
        assert_eq!(config.poll.interval(), Duration::from_secs(600));
    }
}
