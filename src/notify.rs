// Effitherm - Machine efficiency monitoring
// Copyright (c) 2025 Effitherm Engineering
//
// Licensed under AGPL-3.0. See LICENSE file for details.

//! Notification dispatch port.

use crate::error::NotifyError;
use async_trait::async_trait;

/// Title used for pipeline status dispatches.
pub const DISPATCH_TITLE: &str = "Data update";

/// Fire-and-forget delivery of an alert to the platform notifier.
///
/// Delivery and permission handling are platform concerns; the pipeline
/// only hands over a title and body. A failed dispatch is never retried
/// here — the notification is already persisted by the time this runs.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Schedule a notification for immediate delivery.
    async fn schedule(&self, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// Notifier that writes dispatches to the log.
///
/// Stand-in for hosts without a platform notification channel; also the
/// fallback when permission is denied upstream.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn schedule(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(title, body, "notification dispatched");
        Ok(())
    }
}
