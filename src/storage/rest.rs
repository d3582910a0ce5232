// Effitherm - Machine efficiency monitoring
// Copyright (c) 2025 Effitherm Engineering
//
// Licensed under AGPL-3.0. See LICENSE file for details.

//! REST persistence adapter.
//!
//! Speaks the PostgREST dialect used by hosted Postgres backends: rows
//! are plain JSON, filters and ordering travel in the query string, and
//! inserts can return the generated row. Two tables are used:
//! `temperature_efficiency_log` (append-only) and `notifications`
//! (deletable by id). Schema management and auth flows stay outside the
//! core; only the configured key headers are sent.

use crate::config::StorageConfig;
use crate::error::StorageError;
use crate::event::{Notification, NotificationKind};
use crate::reading::Reading;
use crate::storage::PersistenceGateway;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const READINGS_TABLE: &str = "temperature_efficiency_log";
const NOTIFICATIONS_TABLE: &str = "notifications";

/// Row shape of the readings log.
#[derive(Debug, Serialize, Deserialize)]
struct ReadingRow {
    timestamp: DateTime<Utc>,
    temperature: f64,
    efficiency: f64,
}

impl From<&Reading> for ReadingRow {
    fn from(reading: &Reading) -> Self {
        Self {
            timestamp: reading.timestamp,
            temperature: reading.temperature,
            efficiency: reading.efficiency,
        }
    }
}

impl From<ReadingRow> for Reading {
    fn from(row: ReadingRow) -> Self {
        Reading::from_parts(row.timestamp, row.temperature, row.efficiency)
    }
}

/// Row shape of the notifications table.
#[derive(Debug, Serialize, Deserialize)]
struct NotificationRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    message: String,
    notification_type: NotificationKind,
    sent_at: DateTime<Utc>,
    temperature: f64,
    efficiency: f64,
}

impl From<&Notification> for NotificationRow {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id,
            message: n.message.clone(),
            notification_type: n.kind,
            sent_at: n.sent_at,
            temperature: n.temperature,
            efficiency: n.efficiency,
        }
    }
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Notification {
            id: row.id,
            message: row.message,
            sent_at: row.sent_at,
            temperature: row.temperature,
            efficiency: row.efficiency,
            kind: row.notification_type,
        }
    }
}

/// Gateway backed by a PostgREST-compatible store.
pub struct RestGateway {
    client: reqwest::Client,
    config: StorageConfig,
}

impl RestGateway {
    /// Create a gateway from the given settings with a fresh HTTP client.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create a gateway reusing an existing HTTP client.
    pub fn with_client(client: reqwest::Client, config: StorageConfig) -> Self {
        Self { client, config }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.base_url.trim_end_matches('/'), table)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = response.text().await.unwrap_or_default();
        Err(StorageError::Backend {
            status: status.as_u16(),
            detail,
        })
    }
}

#[async_trait]
impl PersistenceGateway for RestGateway {
    async fn save_reading(&self, reading: &Reading) -> Result<(), StorageError> {
        let response = self
            .authed(self.client.post(self.table_url(READINGS_TABLE)))
            .json(&[ReadingRow::from(reading)])
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;
        Self::check(response).await?;
        Ok(())
    }

    async fn save_notification(&self, notification: &Notification) -> Result<i64, StorageError> {
        let response = self
            .authed(self.client.post(self.table_url(NOTIFICATIONS_TABLE)))
            .header("Prefer", "return=representation")
            .json(&[NotificationRow::from(notification)])
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;
        let response = Self::check(response).await?;

        let rows: Vec<NotificationRow> = response
            .json()
            .await
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        rows.first()
            .and_then(|row| row.id)
            .ok_or_else(|| StorageError::Serialization("insert returned no id".to_string()))
    }

    async fn list_notifications(&self) -> Result<Vec<Notification>, StorageError> {
        let response = self
            .authed(self.client.get(self.table_url(NOTIFICATIONS_TABLE)))
            .query(&[("select", "*"), ("order", "sent_at.desc")])
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;
        let response = Self::check(response).await?;

        let rows: Vec<NotificationRow> = response
            .json()
            .await
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(rows.into_iter().map(Notification::from).collect())
    }

    async fn delete_notification(&self, id: i64) -> Result<(), StorageError> {
        let response = self
            .authed(self.client.delete(self.table_url(NOTIFICATIONS_TABLE)))
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;
        Self::check(response).await?;
        Ok(())
    }

    async fn latest_reading(&self) -> Result<Option<Reading>, StorageError> {
        let response = self
            .authed(self.client.get(self.table_url(READINGS_TABLE)))
            .query(&[
                ("select", "*"),
                ("order", "timestamp.desc"),
                ("limit", "1"),
            ])
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;
        let response = Self::check(response).await?;

        let mut rows: Vec<ReadingRow> = response
            .json()
            .await
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.remove(0).into())
        })
    }
}
