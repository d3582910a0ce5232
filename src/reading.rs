// Effitherm - Machine efficiency monitoring
// Copyright (c) 2025 Effitherm Engineering
//
// Licensed under AGPL-3.0. See LICENSE file for details.

//! Reading sample type.

use crate::efficiency;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped (temperature, efficiency) sample.
///
/// Created once per successful acquisition cycle and immutable after
/// creation; the efficiency score is derived from the temperature at
/// construction time so the two never drift apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Acquisition time.
    pub timestamp: DateTime<Utc>,
    /// Temperature in °C.
    pub temperature: f64,
    /// Derived machine efficiency in %.
    pub efficiency: f64,
}

impl Reading {
    /// Build a reading from a raw temperature sample, deriving the
    /// efficiency score.
    pub fn new(timestamp: DateTime<Utc>, temperature: f64) -> Self {
        Self {
            timestamp,
            temperature,
            efficiency: efficiency::compute(temperature),
        }
    }

    /// Build a reading with an already-known efficiency value, as loaded
    /// back from the store.
    pub fn from_parts(timestamp: DateTime<Utc>, temperature: f64, efficiency: f64) -> Self {
        Self {
            timestamp,
            temperature,
            efficiency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    #[test]
    fn test_new_derives_efficiency() {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let reading = Reading::new(at, 25.0);

        assert_eq!(reading.timestamp, at);
        assert_relative_eq!(reading.temperature, 25.0);
        assert_relative_eq!(reading.efficiency, 81.25);
    }

    #[test]
    fn test_from_parts_preserves_stored_efficiency() {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let reading = Reading::from_parts(at, 25.0, 80.0);
        assert_relative_eq!(reading.efficiency, 80.0);
    }

    #[test]
    fn test_serde_roundtrip() {
        let reading = Reading::new(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(), 26.0);
        let json = serde_json::to_string(&reading).unwrap();
        let parsed: Reading = serde_json::from_str(&json).unwrap();
        assert_eq!(reading, parsed);
    }
}
