// Effitherm - Machine efficiency monitoring
// Copyright (c) 2025 Effitherm Engineering
//
// Licensed under AGPL-3.0. See LICENSE file for details.

//! Persistence gateway port and in-memory implementation.
//!
//! The pipeline persists readings as an append-only log and notifications
//! as a deletable list; it never sees the concrete store. [`MemoryGateway`]
//! backs tests and storeless deployments; the REST adapter for a hosted
//! Postgres-style backend lives in [`rest`].

pub mod rest;

use crate::error::StorageError;
use crate::event::Notification;
use crate::reading::Reading;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Durable storage consumed by the pipeline.
///
/// Reading and notification writes are independent and non-transactional;
/// a notification snapshots its triggering values, so partial failure
/// leaves no dangling reference.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Append a reading to the log.
    async fn save_reading(&self, reading: &Reading) -> Result<(), StorageError>;

    /// Persist a notification, returning the store-assigned id.
    async fn save_notification(&self, notification: &Notification) -> Result<i64, StorageError>;

    /// All notifications, newest first by `sent_at`.
    async fn list_notifications(&self) -> Result<Vec<Notification>, StorageError>;

    /// Delete a notification by id.
    async fn delete_notification(&self, id: i64) -> Result<(), StorageError>;

    /// The most recently logged reading, if any.
    async fn latest_reading(&self) -> Result<Option<Reading>, StorageError>;
}

#[derive(Debug, Default)]
struct MemoryInner {
    readings: Vec<Reading>,
    notifications: Vec<Notification>,
    next_id: i64,
}

/// In-memory gateway.
///
/// Keeps everything in process memory with the same ordering semantics as
/// the remote store. Used as the test double and as the fallback when no
/// store is configured.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    inner: RwLock<MemoryInner>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of readings logged so far.
    pub async fn reading_count(&self) -> usize {
        self.inner.read().await.readings.len()
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn save_reading(&self, reading: &Reading) -> Result<(), StorageError> {
        self.inner.write().await.readings.push(reading.clone());
        Ok(())
    }

    async fn save_notification(&self, notification: &Notification) -> Result<i64, StorageError> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let id = inner.next_id;
        inner.notifications.push(notification.clone().with_id(id));
        Ok(id)
    }

    async fn list_notifications(&self) -> Result<Vec<Notification>, StorageError> {
        let inner = self.inner.read().await;
        let mut list = inner.notifications.clone();
        list.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        Ok(list)
    }

    async fn delete_notification(&self, id: i64) -> Result<(), StorageError> {
        let mut inner = self.inner.write().await;
        let before = inner.notifications.len();
        inner.notifications.retain(|n| n.id != Some(id));
        if inner.notifications.len() == before {
            return Err(StorageError::NotFound { id });
        }
        Ok(())
    }

    async fn latest_reading(&self) -> Result<Option<Reading>, StorageError> {
        // Readings arrive in acquisition order, so the last one is newest.
        Ok(self.inner.read().await.readings.last().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn reading(minute: u32, temperature: f64) -> Reading {
        Reading::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 12, minute, 0).unwrap(),
            temperature,
        )
    }

    fn notification(minute: u32) -> Notification {
        Notification::routine(
            Utc.with_ymd_and_hms(2025, 6, 1, 12, minute, 0).unwrap(),
            25.0,
            81.25,
        )
    }

    #[tokio::test]
    async fn test_save_and_latest_reading() {
        let gateway = MemoryGateway::new();
        assert!(gateway.latest_reading().await.unwrap().is_none());

        gateway.save_reading(&reading(0, 20.0)).await.unwrap();
        gateway.save_reading(&reading(1, 21.0)).await.unwrap();

        let latest = gateway.latest_reading().await.unwrap().unwrap();
        assert_eq!(latest.temperature, 21.0);
        assert_eq!(gateway.reading_count().await, 2);
    }

    #[tokio::test]
    async fn test_notification_round_trip() {
        let gateway = MemoryGateway::new();

        let id = gateway
            .save_notification(&notification(0))
            .await
            .unwrap();

        let list = gateway.list_notifications().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, Some(id));

        gateway.delete_notification(id).await.unwrap();
        assert!(gateway.list_notifications().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let gateway = MemoryGateway::new();
        gateway.save_notification(&notification(0)).await.unwrap();
        gateway.save_notification(&notification(5)).await.unwrap();
        gateway.save_notification(&notification(2)).await.unwrap();

        let list = gateway.list_notifications().await.unwrap();
        assert_eq!(list.len(), 3);
        assert!(list[0].sent_at > list[1].sent_at);
        assert!(list[1].sent_at > list[2].sent_at);
    }

    #[tokio::test]
    async fn test_delete_unknown_id() {
        let gateway = MemoryGateway::new();
        let err = gateway.delete_notification(42).await.unwrap_err();
        assert_eq!(err, StorageError::NotFound { id: 42 });
    }

    #[tokio::test]
    async fn test_ids_are_unique_and_increasing() {
        let gateway = MemoryGateway::new();
        let a = gateway.save_notification(&notification(0)).await.unwrap();
        let b = gateway.save_notification(&notification(1)).await.unwrap();
        assert!(b > a);
    }
}
