//! # Effitherm - Machine efficiency monitoring
//!
//! An acquisition-evaluation-alerting pipeline: poll an external
//! temperature source, derive a machine-efficiency score, keep a sliding
//! window of recent readings, persist everything, and raise debounced
//! alerts.
//!
//! ## Key Properties
//!
//! - **Resilient acquisition**: bounded exponential backoff on rate
//!   limits, immediate failure on anything else
//! - **Single worker**: pipeline ticks never overlap; history and alert
//!   state have exactly one writer
//! - **Debounced alerting**: a minimum interval between notifications,
//!   recovered across restarts from the store
//! - **Injected collaborators**: source, store, and notifier are ports,
//!   so every stage tests against doubles
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use effitherm::{
//!     Acquirer, HttpTemperatureSource, LogNotifier, MemoryGateway, MonitorConfig, Pipeline,
//!     Scheduler,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = MonitorConfig::default();
//!     let mut scheduler = Scheduler::new();
//!
//!     let source = HttpTemperatureSource::new(config.source.clone());
//!     let acquirer = Acquirer::new(source, config.retry.clone(), scheduler.shutdown_handle());
//!     let gateway = Arc::new(MemoryGateway::new());
//!     let mut pipeline =
//!         Pipeline::new(acquirer, gateway, LogNotifier::new(), config.alert.clone());
//!
//!     pipeline.bootstrap().await.unwrap();
//!     scheduler.start(config.poll.interval(), pipeline);
//!
//!     tokio::time::sleep(Duration::from_secs(3600)).await;
//!     scheduler.stop().await;
//! }
//! ```
//!
//! ## Modules
//!
//! - [`acquire`]: fetch-with-retry acquisition
//! - [`alert`]: threshold evaluation and debouncing
//! - [`config`]: monitor configuration
//! - [`efficiency`]: temperature to efficiency transform
//! - [`history`]: bounded sliding window of readings
//! - [`scheduler`]: periodic execution and cancellation
//! - [`source`]: temperature source port and HTTP implementation
//! - [`storage`]: persistence gateway port, memory and REST backends

// Modules
pub mod acquire;
pub mod alert;
pub mod config;
pub mod efficiency;
pub mod error;
pub mod event;
pub mod history;
pub mod notify;
pub mod pipeline;
pub mod reading;
pub mod retry;
pub mod scheduler;
pub mod source;
pub mod storage;

// Re-exports for convenient access
pub use acquire::Acquirer;
pub use alert::{AlertCondition, AlertEngine, AlertState};
pub use config::{AlertConfig, MonitorConfig, PollConfig, SourceConfig, StorageConfig};
pub use error::{
    AcquireError, ConfigError, EffithermError, NotifyError, Result, SourceError, StorageError,
};
pub use event::{Notification, NotificationKind};
pub use history::HistoryBuffer;
pub use notify::{LogNotifier, Notifier, DISPATCH_TITLE};
pub use pipeline::Pipeline;
pub use reading::Reading;
pub use retry::RetryPolicy;
pub use scheduler::{Scheduler, Shutdown};
pub use source::{HttpTemperatureSource, TemperatureSource};
pub use storage::{rest::RestGateway, MemoryGateway, PersistenceGateway};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_end_to_end_efficiency_samples() {
        let now = chrono::Utc::now();
        assert_eq!(Reading::new(now, 25.0).efficiency, 81.25);
        assert_eq!(Reading::new(now, 30.0).efficiency, 100.0);
        assert_eq!(Reading::new(now, 10.0).efficiency, 75.0);
    }
}
