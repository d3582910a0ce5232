// Effitherm - Machine efficiency monitoring
// Copyright (c) 2025 Effitherm Engineering
//
// Licensed under AGPL-3.0. See LICENSE file for details.

//! Threshold alerting with time-based debouncing.
//!
//! Each evaluation runs a simple two-state machine:
//!
//! ```text
//!            thresholds met, debounce elapsed
//!   Idle ───────────────────────────────────► Fired (emits, stamps state)
//!    ▲                                          │
//!    └──────────────────────────────────────────┘
//!
//!   within debounce window ──► Suppressed (no emission, state untouched)
//! ```
//!
//! A suppressed or failed emission is never retried; the next reading
//! simply evaluates fresh.

use crate::config::AlertConfig;
use crate::event::Notification;
use crate::reading::Reading;
use chrono::{DateTime, Duration, Utc};

/// Alert condition classification for a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertCondition {
    /// Both thresholds crossed.
    BothCritical,
    /// Temperature at or above the critical bound.
    TemperatureCritical,
    /// Efficiency at or below the critical bound.
    EfficiencyCritical,
    /// No threshold crossed.
    Routine,
}

impl AlertCondition {
    /// Whether this condition represents a threshold crossing.
    pub fn is_critical(&self) -> bool {
        !matches!(self, Self::Routine)
    }
}

/// Debounce state carried across evaluation cycles.
///
/// Mutated only by [`AlertEngine::evaluate`]; lives for the process
/// lifetime and is re-seeded on startup from the newest persisted
/// notification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertState {
    /// When the last notification was emitted.
    pub last_alert_at: Option<DateTime<Utc>>,
}

impl AlertState {
    /// Fresh state with no prior emission.
    pub fn new() -> Self {
        Self::default()
    }

    /// State recovered from a persisted emission time.
    pub fn from_last_alert(last_alert_at: Option<DateTime<Utc>>) -> Self {
        Self { last_alert_at }
    }
}

/// Evaluates readings against thresholds and enforces the minimum
/// inter-alert interval.
#[derive(Debug, Clone)]
pub struct AlertEngine {
    config: AlertConfig,
}

impl AlertEngine {
    pub fn new(config: AlertConfig) -> Self {
        Self { config }
    }

    /// Classify a reading against the configured thresholds.
    pub fn classify(&self, reading: &Reading) -> AlertCondition {
        let temp_critical = reading.temperature >= self.config.temperature_critical;
        let eff_critical = reading.efficiency <= self.config.efficiency_critical;

        match (temp_critical, eff_critical) {
            (true, true) => AlertCondition::BothCritical,
            (true, false) => AlertCondition::TemperatureCritical,
            (false, true) => AlertCondition::EfficiencyCritical,
            (false, false) => AlertCondition::Routine,
        }
    }

    /// Evaluate one reading, emitting a notification when allowed.
    ///
    /// Pure with respect to its inputs given `now`. Emission is
    /// suppressed while `now - last_alert_at` is below the debounce
    /// interval; in informational mode a routine status notification is
    /// produced whenever the window has elapsed, while `critical_only`
    /// restricts emission to threshold crossings. `state` is stamped
    /// only when a notification is actually returned.
    pub fn evaluate(
        &self,
        reading: &Reading,
        state: &mut AlertState,
        now: DateTime<Utc>,
    ) -> Option<Notification> {
        if let Some(last) = state.last_alert_at {
            let debounce = Duration::milliseconds(self.config.debounce_ms as i64);
            if now - last < debounce {
                return None;
            }
        }

        let condition = self.classify(reading);
        if self.config.critical_only && !condition.is_critical() {
            return None;
        }

        let notification = match condition {
            AlertCondition::BothCritical => {
                Notification::both_critical(now, reading.temperature, reading.efficiency)
            }
            AlertCondition::TemperatureCritical => {
                Notification::temperature_critical(now, reading.temperature, reading.efficiency)
            }
            AlertCondition::EfficiencyCritical => {
                Notification::efficiency_critical(now, reading.temperature, reading.efficiency)
            }
            AlertCondition::Routine => {
                Notification::routine(now, reading.temperature, reading.efficiency)
            }
        };

        state.last_alert_at = Some(now);
        Some(notification)
    }

    /// Engine configuration.
    pub fn config(&self) -> &AlertConfig {
        &self.config
    }
}
