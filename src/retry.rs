// Effitherm - Machine efficiency monitoring
// Copyright (c) 2025 Effitherm Engineering
//
// Licensed under AGPL-3.0. See LICENSE file for details.

//! Retry policy
//!
//! Pure backoff decision logic, kept separate from the I/O loop that
//! executes it so the schedule is testable without sleeping.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Exponential backoff policy for the acquisition retry loop.
///
/// `max_attempts` bounds the total number of fetch attempts (not just the
/// retries), so a policy with `max_attempts = 5` performs at most five
/// fetches with four backoff waits between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total fetch attempts allowed per acquisition cycle.
    pub max_attempts: u32,
    /// Delay before the first retry (ms).
    pub initial_delay_ms: u64,
    /// Multiplier applied to the delay after each retry.
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 10_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with explicit parameters.
    pub fn new(max_attempts: u32, initial_delay: Duration, backoff_multiplier: f64) -> Self {
        Self {
            max_attempts,
            initial_delay_ms: initial_delay.as_millis() as u64,
            backoff_multiplier,
        }
    }

    /// Delay to wait after the given failed attempt (0-indexed).
    ///
    /// Returns `None` once the attempt budget is spent and the caller
    /// should stop retrying.
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        if attempt + 1 >= self.max_attempts {
            return None;
        }
        let delay_ms =
            self.initial_delay_ms as f64 * self.backoff_multiplier.powi(attempt as i32);
        Some(Duration::from_millis(delay_ms as u64))
    }

    /// Delay before the first retry.
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}
