//! Error types for effitherm
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias for effitherm operations
pub type Result<T> = std::result::Result<T, EffithermError>;

/// Main error type for effitherm operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EffithermError {
    /// Acquisition error
    #[error("Acquisition error: {0}")]
    Acquire(#[from] AcquireError),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Notification dispatch error
    #[error("Dispatch error: {0}")]
    Notify(#[from] NotifyError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors reported by a temperature source for a single attempt
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    /// The source rejected the request with HTTP 429; the attempt may be retried
    #[error("Rate limited by source")]
    RateLimited,

    /// Non-success, non-429 HTTP status
    #[error("Source returned HTTP {status}")]
    Http { status: u16 },

    /// Connection, DNS, or timeout failure before a status was received
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The response body did not contain a numeric temperature
    #[error("Malformed response body: {0}")]
    MalformedBody(String),
}

impl SourceError {
    /// Whether the retry loop may attempt this fetch again.
    ///
    /// Only a rate-limit response is retryable; every other failure is
    /// fatal for the current acquisition cycle.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

/// Errors produced by a full acquisition cycle
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AcquireError {
    /// A non-retryable source failure aborted the cycle
    #[error("Network error: {0}")]
    Network(#[from] SourceError),

    /// Every allowed attempt ended in a rate-limit response
    #[error("Retries exhausted after {attempts} attempts")]
    ExhaustedRetries { attempts: u32 },

    /// Shutdown was signalled while waiting out a backoff delay
    #[error("Acquisition cancelled by shutdown")]
    Cancelled,
}

/// Errors from the persistence gateway
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    /// The backing store rejected the operation
    #[error("Store rejected operation with status {status}: {detail}")]
    Backend { status: u16, detail: String },

    /// Connection-level failure talking to the store
    #[error("Store transport failure: {0}")]
    Transport(String),

    /// Row (de)serialization failed
    #[error("Row serialization failed: {0}")]
    Serialization(String),

    /// Delete target does not exist
    #[error("No notification with id {id}")]
    NotFound { id: i64 },
}

/// Errors from notification dispatch
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotifyError {
    /// Delivery permission is unavailable on this host
    #[error("Notification permission denied")]
    PermissionDenied,

    /// The dispatch channel failed
    #[error("Dispatch failed: {0}")]
    Dispatch(String),
}

/// Errors while loading configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Cannot read config file {path}: {detail}")]
    Io { path: String, detail: String },

    /// Config file is not valid JSON for the expected schema
    #[error("Cannot parse config: {0}")]
    Parse(String),
}
