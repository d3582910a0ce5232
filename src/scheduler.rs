// Effitherm - Machine efficiency monitoring
// Copyright (c) 2025 Effitherm Engineering
//
// Licensed under AGPL-3.0. See LICENSE file for details.

//! Periodic pipeline execution and cancellation.
//!
//! One worker task drives the pipeline: ticks never overlap, a slow tick
//! delays the next firing instead of running beside it, and shutdown is
//! observable from inside a backoff sleep so stopping never waits out the
//! full retry schedule.

use crate::notify::Notifier;
use crate::pipeline::Pipeline;
use crate::source::TemperatureSource;
use crate::storage::PersistenceGateway;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Cloneable handle observing the scheduler's shutdown signal.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    /// A handle that never signals, for running a pipeline without a
    /// scheduler.
    pub fn never() -> Self {
        // The sender drops immediately; a closed channel can never
        // signal, and `wait` pends forever on it.
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    /// Whether shutdown has been signalled.
    pub fn is_signalled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until shutdown is signalled.
    pub async fn wait(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                // Scheduler gone without signalling; nothing will ever
                // signal this handle again.
                std::future::pending::<()>().await;
            }
        }
    }

    /// Sleep for `duration` unless shutdown arrives first.
    ///
    /// Returns `true` if the full duration elapsed, `false` if the sleep
    /// was interrupted by shutdown.
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.wait() => false,
        }
    }
}

/// Drives the pipeline on a recurring timer.
///
/// The first tick fires immediately on start; subsequent ticks follow the
/// configured interval.
pub struct Scheduler {
    shutdown_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            shutdown_tx,
            handle: None,
        }
    }

    /// Handle for collaborators that need to observe shutdown, such as
    /// the acquirer's backoff sleep.
    pub fn shutdown_handle(&self) -> Shutdown {
        Shutdown {
            rx: self.shutdown_tx.subscribe(),
        }
    }

    /// Whether the worker task has been started and not yet stopped.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Spawn the worker task running one pipeline tick per interval.
    ///
    /// A failed tick is logged and skipped; the worker only exits on
    /// shutdown.
    pub fn start<S, G, N>(&mut self, interval: Duration, mut pipeline: Pipeline<S, G, N>)
    where
        S: TemperatureSource + 'static,
        G: PersistenceGateway + 'static,
        N: Notifier + 'static,
    {
        let mut shutdown = self.shutdown_handle();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_ms = interval.as_millis() as u64, "scheduler started");

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.wait() => break,
                    _ = ticker.tick() => {
                        match pipeline.tick().await {
                            Ok(reading) => debug!(
                                temperature = reading.temperature,
                                efficiency = reading.efficiency,
                                "tick complete"
                            ),
                            Err(e) => warn!(error = %e, "tick failed, skipping to next interval"),
                        }
                    }
                }
            }
            info!("scheduler stopped");
        });
        self.handle = Some(handle);
    }

    /// Signal shutdown and wait for the worker to finish.
    ///
    /// Safe to call at any time, including mid-backoff; an in-flight
    /// network or storage operation completes, but no further tick
    /// begins.
    pub async fn stop(&mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test]
    async fn test_shutdown_handle_observes_signal() {
        let scheduler = Scheduler::new();
        let handle = scheduler.shutdown_handle();
        assert!(!handle.is_signalled());

        scheduler.shutdown_tx.send(true).unwrap();
        assert!(handle.is_signalled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_runs_to_completion() {
        let scheduler = Scheduler::new();
        let mut handle = scheduler.shutdown_handle();

        let start = Instant::now();
        assert!(handle.sleep(Duration::from_secs(30)).await);
        assert_eq!(start.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_interrupted_by_shutdown() {
        let scheduler = Scheduler::new();
        let mut handle = scheduler.shutdown_handle();
        let tx = scheduler.shutdown_tx.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            let _ = tx.send(true);
        });

        let start = Instant::now();
        // A 160s backoff wait must end as soon as shutdown arrives.
        assert!(!handle.sleep(Duration::from_secs(160)).await);
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_handle_does_not_interrupt() {
        let mut handle = Shutdown::never();
        assert!(!handle.is_signalled());
        assert!(handle.sleep(Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_stop_without_start_is_safe() {
        let mut scheduler = Scheduler::new();
        assert!(!scheduler.is_running());
        scheduler.stop().await;
    }
}
