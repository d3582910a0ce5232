//! Integration tests for the acquisition-evaluation-alerting pipeline.

use async_trait::async_trait;
use effitherm::{
    Acquirer, AlertConfig, LogNotifier, MemoryGateway, Notification, PersistenceGateway, Pipeline,
    RetryPolicy, Scheduler, SourceError, TemperatureSource,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Source that walks through a fixed list of temperatures, then repeats
/// the last one.
struct SequenceSource {
    temperatures: Vec<f64>,
    position: AtomicUsize,
}

impl SequenceSource {
    fn new(temperatures: Vec<f64>) -> Self {
        Self {
            temperatures,
            position: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TemperatureSource for SequenceSource {
    async fn sample(&self) -> Result<f64, SourceError> {
        let i = self.position.fetch_add(1, Ordering::SeqCst);
        Ok(*self
            .temperatures
            .get(i)
            .or_else(|| self.temperatures.last())
            .expect("sequence must not be empty"))
    }
}

/// Source that is rate limited forever.
struct ThrottledSource;

#[async_trait]
impl TemperatureSource for ThrottledSource {
    async fn sample(&self) -> Result<f64, SourceError> {
        Err(SourceError::RateLimited)
    }
}

fn sequence_pipeline(
    temperatures: Vec<f64>,
    gateway: Arc<MemoryGateway>,
) -> Pipeline<SequenceSource, MemoryGateway, LogNotifier> {
    Pipeline::new(
        Acquirer::detached(SequenceSource::new(temperatures), RetryPolicy::default()),
        gateway,
        LogNotifier::new(),
        AlertConfig::default(),
    )
}

#[tokio::test]
async fn end_to_end_scenario_derives_expected_efficiencies() {
    let gateway = Arc::new(MemoryGateway::new());
    let mut pipeline = sequence_pipeline(vec![25.0, 30.0, 10.0], Arc::clone(&gateway));

    let first = pipeline.tick().await.unwrap();
    let second = pipeline.tick().await.unwrap();
    let third = pipeline.tick().await.unwrap();

    assert_eq!(first.efficiency, 81.25);
    assert_eq!(second.efficiency, 100.0);
    assert_eq!(third.efficiency, 75.0);

    // All three landed in the log and the window, in acquisition order.
    assert_eq!(gateway.reading_count().await, 3);
    let history = pipeline.history();
    let snapshot = history.read().await.snapshot();
    assert_eq!(snapshot.len(), 3);
    assert_eq!(snapshot[0].temperature, 25.0);
    assert_eq!(snapshot[2].temperature, 10.0);

    // 25.0 °C crossed the temperature threshold; the two follow-ups fell
    // inside the debounce window.
    let notifications = gateway.list_notifications().await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].message.contains("25.0°C"));
}

#[tokio::test]
async fn notification_round_trip_through_gateway() {
    let gateway = MemoryGateway::new();

    let n = Notification::routine(chrono::Utc::now(), 25.0, 81.25);
    let id = gateway.save_notification(&n).await.unwrap();

    let list = gateway.list_notifications().await.unwrap();
    assert!(list.iter().any(|item| item.id == Some(id)));

    gateway.delete_notification(id).await.unwrap();
    let list = gateway.list_notifications().await.unwrap();
    assert!(!list.iter().any(|item| item.id == Some(id)));
}

#[tokio::test(start_paused = true)]
async fn scheduler_ticks_on_interval_and_stops_cleanly() {
    let gateway = Arc::new(MemoryGateway::new());
    let mut scheduler = Scheduler::new();

    let acquirer = Acquirer::new(
        SequenceSource::new(vec![19.0]),
        RetryPolicy::default(),
        scheduler.shutdown_handle(),
    );
    let pipeline = Pipeline::new(
        acquirer,
        Arc::clone(&gateway),
        LogNotifier::new(),
        AlertConfig {
            // Keep the alert path quiet for this test.
            critical_only: true,
            ..Default::default()
        },
    );

    scheduler.start(Duration::from_secs(60), pipeline);

    // The first tick fires immediately.
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(gateway.reading_count().await, 1);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(gateway.reading_count().await, 2);

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(gateway.reading_count().await, 4);

    scheduler.stop().await;

    // No tick begins after stop.
    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(gateway.reading_count().await, 4);
}

#[tokio::test(start_paused = true)]
async fn stop_during_backoff_does_not_wait_out_the_delay() {
    let gateway = Arc::new(MemoryGateway::new());
    let mut scheduler = Scheduler::new();

    let acquirer = Acquirer::new(
        ThrottledSource,
        RetryPolicy::default(),
        scheduler.shutdown_handle(),
    );
    let pipeline = Pipeline::new(
        acquirer,
        Arc::clone(&gateway),
        LogNotifier::new(),
        AlertConfig::default(),
    );

    scheduler.start(Duration::from_secs(600), pipeline);

    // First tick starts immediately, fails its first attempt, and goes
    // into the 10s backoff sleep.
    tokio::time::sleep(Duration::from_secs(2)).await;

    let stop_started = Instant::now();
    scheduler.stop().await;

    // Stop resolved via the shutdown signal, not by waiting out backoff.
    assert!(stop_started.elapsed() < Duration::from_secs(10));
    assert_eq!(gateway.reading_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn rate_limited_cycle_exhausts_with_expected_schedule() {
    let (policy, mut acquirer) = {
        let policy = RetryPolicy::default();
        (
            policy.clone(),
            Acquirer::detached(ThrottledSource, policy),
        )
    };

    let start = Instant::now();
    let err = acquirer.fetch().await.unwrap_err();

    assert_eq!(
        err,
        effitherm::AcquireError::ExhaustedRetries {
            attempts: policy.max_attempts
        }
    );
    // 10 + 20 + 40 + 80 seconds of backoff across the five attempts.
    assert_eq!(start.elapsed(), Duration::from_secs(150));
}
