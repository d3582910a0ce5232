// Effitherm - Machine efficiency monitoring
// Copyright (c) 2025 Effitherm Engineering
//
// Licensed under AGPL-3.0. See LICENSE file for details.

//! Pipeline orchestration.
//!
//! One tick runs the full acquisition cycle: fetch a sample, derive the
//! reading, record it in the history window and the store, evaluate the
//! alert engine, and dispatch whatever it emits. The pipeline owns the
//! history buffer and alert state exclusively; collaborators receive
//! read-only snapshots.

use crate::acquire::Acquirer;
use crate::alert::{AlertEngine, AlertState};
use crate::config::AlertConfig;
use crate::error::{EffithermError, NotifyError, StorageError};
use crate::history::HistoryBuffer;
use crate::notify::{Notifier, DISPATCH_TITLE};
use crate::reading::Reading;
use crate::source::TemperatureSource;
use crate::storage::PersistenceGateway;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// The acquisition-evaluation-alerting pipeline.
///
/// Collaborators are injected at construction; there is no process-wide
/// state. History and alert state are only mutated after a successful
/// reading exists, so a failed tick leaves both untouched.
pub struct Pipeline<S, G, N> {
    acquirer: Acquirer<S>,
    gateway: Arc<G>,
    notifier: N,
    engine: AlertEngine,
    state: AlertState,
    history: Arc<RwLock<HistoryBuffer>>,
}

impl<S, G, N> Pipeline<S, G, N>
where
    S: TemperatureSource,
    G: PersistenceGateway,
    N: Notifier,
{
    /// Assemble a pipeline from its collaborators.
    pub fn new(acquirer: Acquirer<S>, gateway: Arc<G>, notifier: N, alert: AlertConfig) -> Self {
        Self {
            acquirer,
            gateway,
            notifier,
            engine: AlertEngine::new(alert),
            state: AlertState::new(),
            history: Arc::new(RwLock::new(HistoryBuffer::new())),
        }
    }

    /// Recover the alert state from the newest persisted notification so
    /// a restart does not double-fire inside the debounce window.
    pub async fn bootstrap(&mut self) -> Result<(), StorageError> {
        let notifications = self.gateway.list_notifications().await?;
        let last_alert_at = notifications.first().map(|n| n.sent_at);
        if let Some(at) = last_alert_at {
            info!(last_alert_at = %at, "recovered alert state");
        }
        self.state = AlertState::from_last_alert(last_alert_at);
        Ok(())
    }

    /// Shared read-only view of the history window for charting.
    pub fn history(&self) -> Arc<RwLock<HistoryBuffer>> {
        Arc::clone(&self.history)
    }

    /// Last emitted alert time, if any.
    pub fn last_alert_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.state.last_alert_at
    }

    /// Run one full acquisition cycle.
    ///
    /// Also callable directly for a manual refresh between scheduled
    /// ticks. Errors abort the remainder of the cycle and propagate to
    /// the caller; nothing in here retries.
    pub async fn tick(&mut self) -> Result<Reading, EffithermError> {
        let reading = self.acquirer.fetch().await?;

        self.history.write().await.push(reading.clone());
        self.gateway.save_reading(&reading).await?;

        // The reading's own timestamp is the evaluation clock.
        let evaluated = self
            .engine
            .evaluate(&reading, &mut self.state, reading.timestamp);

        if let Some(notification) = evaluated {
            let id = self.gateway.save_notification(&notification).await?;
            info!(id, message = %notification.message, "notification persisted");

            match self.notifier.schedule(DISPATCH_TITLE, &notification.message).await {
                Ok(()) => {}
                Err(NotifyError::PermissionDenied) => {
                    // The notification is persisted; delivery is best-effort.
                    warn!("dispatch skipped: notification permission denied");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(reading)
    }
}
