// Effitherm - Machine efficiency monitoring
// Copyright (c) 2025 Effitherm Engineering
//
// Licensed under AGPL-3.0. See LICENSE file for details.

//! Resilient sample acquisition.
//!
//! The acquirer executes the [`RetryPolicy`] decision against a
//! [`TemperatureSource`]: rate-limit responses are waited out with
//! exponential backoff, anything else fails the cycle immediately. The
//! scheduler guarantees a single fetch is in flight at a time.

use crate::error::AcquireError;
use crate::reading::Reading;
use crate::retry::RetryPolicy;
use crate::scheduler::Shutdown;
use crate::source::TemperatureSource;
use chrono::Utc;
use tracing::{debug, warn};

/// Fetches one reading per call, retrying rate-limited attempts.
pub struct Acquirer<S> {
    source: S,
    policy: RetryPolicy,
    shutdown: Shutdown,
}

impl<S: TemperatureSource> Acquirer<S> {
    /// Create an acquirer observing the given shutdown handle during
    /// backoff waits.
    pub fn new(source: S, policy: RetryPolicy, shutdown: Shutdown) -> Self {
        Self {
            source,
            policy,
            shutdown,
        }
    }

    /// Create an acquirer that cannot be interrupted mid-backoff.
    pub fn detached(source: S, policy: RetryPolicy) -> Self {
        Self::new(source, policy, Shutdown::never())
    }

    /// Fetch one sample and build a reading stamped with the current
    /// time.
    ///
    /// Resolves rate limiting internally per the policy; all other
    /// failures abort the cycle and propagate.
    pub async fn fetch(&mut self) -> Result<Reading, AcquireError> {
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            match self.source.sample().await {
                Ok(temperature) => {
                    let reading = Reading::new(Utc::now(), temperature);
                    debug!(
                        temperature = reading.temperature,
                        efficiency = reading.efficiency,
                        attempts,
                        "sample acquired"
                    );
                    return Ok(reading);
                }
                Err(err) if err.is_retryable() => {
                    match self.policy.delay_for_attempt(attempts - 1) {
                        Some(delay) => {
                            warn!(
                                attempts,
                                delay_ms = delay.as_millis() as u64,
                                "rate limited, backing off"
                            );
                            if !self.shutdown.sleep(delay).await {
                                return Err(AcquireError::Cancelled);
                            }
                        }
                        None => {
                            return Err(AcquireError::ExhaustedRetries { attempts });
                        }
                    }
                }
                Err(err) => {
                    warn!(error = %err, "fatal source error");
                    return Err(AcquireError::Network(err));
                }
            }
        }
    }

    /// The configured retry policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}
