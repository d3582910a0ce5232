// Effitherm - Machine efficiency monitoring
// Copyright (c) 2025 Effitherm Engineering
//
// Licensed under AGPL-3.0. See LICENSE file for details.

//! Notification types and message construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Raised by the monitored device pipeline.
    Device,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Device => "device",
        }
    }
}

/// A persisted alert or status message.
///
/// Snapshots the temperature and efficiency that triggered it; it holds
/// no reference to the originating reading. The id is assigned by the
/// store on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Store-assigned identifier; `None` until persisted.
    pub id: Option<i64>,
    /// Human-readable message.
    pub message: String,
    /// Emission time.
    pub sent_at: DateTime<Utc>,
    /// Temperature at emission (°C).
    pub temperature: f64,
    /// Efficiency at emission (%).
    pub efficiency: f64,
    /// Notification category.
    pub kind: NotificationKind,
}

impl Notification {
    /// Create a notification with an explicit message.
    pub fn new(
        message: impl Into<String>,
        sent_at: DateTime<Utc>,
        temperature: f64,
        efficiency: f64,
    ) -> Self {
        Self {
            id: None,
            message: message.into(),
            sent_at,
            temperature,
            efficiency,
            kind: NotificationKind::Device,
        }
    }

    /// Both thresholds crossed.
    pub fn both_critical(sent_at: DateTime<Utc>, temperature: f64, efficiency: f64) -> Self {
        Self::new(
            format!(
                "Temperature reached {temperature:.1}°C and efficiency dropped to \
                 {efficiency:.1}%. Immediate action required."
            ),
            sent_at,
            temperature,
            efficiency,
        )
    }

    /// Temperature threshold crossed.
    pub fn temperature_critical(sent_at: DateTime<Utc>, temperature: f64, efficiency: f64) -> Self {
        Self::new(
            format!("Temperature reached {temperature:.1}°C. Check the system."),
            sent_at,
            temperature,
            efficiency,
        )
    }

    /// Efficiency threshold crossed.
    pub fn efficiency_critical(sent_at: DateTime<Utc>, temperature: f64, efficiency: f64) -> Self {
        Self::new(
            format!("Efficiency dropped to {efficiency:.1}%. Action required."),
            sent_at,
            temperature,
            efficiency,
        )
    }

    /// Routine status update, no threshold crossed.
    pub fn routine(sent_at: DateTime<Utc>, temperature: f64, efficiency: f64) -> Self {
        Self::new(
            format!("Temperature: {temperature:.1}°C, efficiency: {efficiency:.1}%"),
            sent_at,
            temperature,
            efficiency,
        )
    }

    /// Copy with the store-assigned id filled in.
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Human-readable age of this notification relative to `now`
    /// ("3 minutes ago", "2 hours ago", "1 day ago").
    pub fn age_from(&self, now: DateTime<Utc>) -> String {
        let minutes = (now - self.sent_at).num_minutes().max(0);
        let hours = minutes / 60;
        let days = hours / 24;

        if days > 0 {
            format!("{} day{} ago", days, if days > 1 { "s" } else { "" })
        } else if hours > 0 {
            format!("{} hour{} ago", hours, if hours > 1 { "s" } else { "" })
        } else {
            format!("{} minute{} ago", minutes, if minutes == 1 { "" } else { "s" })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_kind_as_str() {
        assert_eq!(NotificationKind::Device.as_str(), "device");
    }

    #[test]
    fn test_temperature_critical_message() {
        let n = Notification::temperature_critical(at(), 22.5, 75.0);
        assert!(n.message.contains("22.5°C"));
        assert!(n.message.contains("Check the system"));
        assert_eq!(n.kind, NotificationKind::Device);
        assert!(n.id.is_none());
    }

    #[test]
    fn test_efficiency_critical_message() {
        let n = Notification::efficiency_critical(at(), 18.0, 68.2);
        assert!(n.message.contains("68.2%"));
        assert!(n.message.contains("Action required"));
    }

    #[test]
    fn test_both_critical_message() {
        let n = Notification::both_critical(at(), 31.0, 60.0);
        assert!(n.message.contains("31.0°C"));
        assert!(n.message.contains("60.0%"));
        assert!(n.message.contains("Immediate action required"));
    }

    #[test]
    fn test_routine_message() {
        let n = Notification::routine(at(), 25.0, 81.25);
        assert!(n.message.contains("25.0°C"));
        assert!(n.message.contains("81.2%") || n.message.contains("81.3%"));
    }

    #[test]
    fn test_with_id() {
        let n = Notification::routine(at(), 25.0, 81.25).with_id(7);
        assert_eq!(n.id, Some(7));
    }

    #[test]
    fn test_age_formatting() {
        let n = Notification::routine(at(), 25.0, 81.25);

        assert_eq!(n.age_from(at() + Duration::minutes(3)), "3 minutes ago");
        assert_eq!(n.age_from(at() + Duration::minutes(1)), "1 minute ago");
        assert_eq!(n.age_from(at() + Duration::hours(2)), "2 hours ago");
        assert_eq!(n.age_from(at() + Duration::days(1)), "1 day ago");
    }

    #[test]
    fn test_snapshot_values_kept() {
        let n = Notification::both_critical(at(), 31.0, 60.0);
        assert!((n.temperature - 31.0).abs() < f64::EPSILON);
        assert!((n.efficiency - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_serde_roundtrip() {
        let n = Notification::temperature_critical(at(), 22.0, 75.0).with_id(3);
        let json = serde_json::to_string(&n).unwrap();
        assert!(json.contains("\"device\""));
        let parsed: Notification = serde_json::from_str(&json).unwrap();
        assert_eq!(n, parsed);
    }
}
