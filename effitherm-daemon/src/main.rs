// Effitherm Daemon - Host process for the monitoring pipeline
// Copyright (c) 2025 Effitherm Engineering
//
// Licensed under AGPL-3.0. See LICENSE file for details.

//! # Effitherm Daemon
//!
//! Wires the monitoring pipeline to a weather source and a persistence
//! store, runs it on a schedule, and serves liveness/status endpoints.
//!
//! ## Usage
//!
//! ```bash
//! # Run with a config file
//! effitherm-daemon --config monitor.json
//!
//! # Poll every minute instead of the configured interval
//! effitherm-daemon --config monitor.json --fast
//! ```
//!
//! API keys can be supplied via `EFFITHERM_SOURCE_KEY`,
//! `EFFITHERM_STORE_KEY`, and `EFFITHERM_LOCATION` instead of the config
//! file.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use clap::Parser;
use effitherm::{
    Acquirer, HistoryBuffer, HttpTemperatureSource, LogNotifier, MemoryGateway, MonitorConfig,
    PersistenceGateway, Pipeline, PollConfig, RestGateway, Scheduler,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Effitherm monitoring daemon
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<String>,

    /// Port for the status endpoints
    #[arg(short, long, default_value = "9464")]
    port: u16,

    /// Poll every minute instead of the configured interval
    #[arg(long)]
    fast: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Application state shared across handlers.
struct AppState<G> {
    history: Arc<RwLock<HistoryBuffer>>,
    gateway: Arc<G>,
    started_at: std::time::Instant,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Effitherm Daemon v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &args.config {
        Some(path) => match MonitorConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            info!("No config file specified, using defaults");
            MonitorConfig::default()
        }
    };

    apply_env_overrides(&mut config);

    if args.fast {
        config.poll.interval_ms = PollConfig::FAST_INTERVAL_MS;
    }

    if config.storage.is_configured() {
        let gateway = Arc::new(RestGateway::new(config.storage.clone()));
        run(args, config, gateway).await;
    } else {
        warn!("No store configured, readings will not survive restarts");
        let gateway = Arc::new(MemoryGateway::new());
        run(args, config, gateway).await;
    }
}

/// Pull secrets and location from the environment when present.
fn apply_env_overrides(config: &mut MonitorConfig) {
    if let Ok(key) = std::env::var("EFFITHERM_SOURCE_KEY") {
        config.source.api_key = key;
    }
    if let Ok(key) = std::env::var("EFFITHERM_STORE_KEY") {
        config.storage.api_key = key;
    }
    if let Ok(location) = std::env::var("EFFITHERM_LOCATION") {
        config.source.location = location;
    }
}

async fn run<G>(args: Args, config: MonitorConfig, gateway: Arc<G>)
where
    G: PersistenceGateway + 'static,
{
    let mut scheduler = Scheduler::new();

    let source = HttpTemperatureSource::new(config.source.clone());
    let acquirer = Acquirer::new(source, config.retry.clone(), scheduler.shutdown_handle());
    let mut pipeline = Pipeline::new(
        acquirer,
        Arc::clone(&gateway),
        LogNotifier::new(),
        config.alert.clone(),
    );

    if let Err(e) = pipeline.bootstrap().await {
        warn!(error = %e, "Could not recover alert state, starting fresh");
    }

    let state = Arc::new(AppState {
        history: pipeline.history(),
        gateway,
        started_at: std::time::Instant::now(),
    });

    info!(
        interval_ms = config.poll.interval_ms,
        "Starting monitoring pipeline"
    );
    scheduler.start(config.poll.interval(), pipeline);

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler::<G>))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Status endpoints on http://{}", addr);

    let listener = TcpListener::bind(addr).await.unwrap();
    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Status server failed: {}", e);
        }
    });

    tokio::signal::ctrl_c().await.ok();
    info!("Shutdown requested");

    scheduler.stop().await;
    server.abort();
}

/// Health check handler.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Status information response.
#[derive(Serialize)]
struct StatusResponse {
    version: String,
    uptime_secs: u64,
    /// Latest reading; `null` while no data has been acquired, so the
    /// consumer shows an explicit unavailable state instead of a stale
    /// value.
    data: Option<CurrentData>,
    history: HistoryView,
    /// Most recent notifications, newest first.
    notifications: Vec<NotificationView>,
}

/// Latest acquired values.
#[derive(Serialize)]
struct CurrentData {
    timestamp: DateTime<Utc>,
    temperature: f64,
    efficiency: f64,
}

/// Chartable view of the sliding window, oldest first.
#[derive(Serialize)]
struct HistoryView {
    temperatures: Vec<f64>,
    efficiencies: Vec<f64>,
}

/// One entry of the notification feed.
#[derive(Serialize)]
struct NotificationView {
    message: String,
    sent_at: DateTime<Utc>,
    age: String,
}

/// Status handler - returns JSON status information.
async fn status_handler<G>(State(state): State<Arc<AppState<G>>>) -> Json<StatusResponse>
where
    G: PersistenceGateway + 'static,
{
    let snapshot = state.history.read().await.snapshot();

    // Before the first tick the window is empty; fall back to the last
    // persisted reading rather than reporting nothing after a restart.
    let current = match snapshot.last() {
        Some(reading) => Some(reading.clone()),
        None => state.gateway.latest_reading().await.ok().flatten(),
    };

    let data = current.map(|reading| CurrentData {
        timestamp: reading.timestamp,
        temperature: reading.temperature,
        efficiency: reading.efficiency,
    });

    let now = Utc::now();
    let notifications = state
        .gateway
        .list_notifications()
        .await
        .unwrap_or_default()
        .into_iter()
        .take(5)
        .map(|n| NotificationView {
            age: n.age_from(now),
            message: n.message,
            sent_at: n.sent_at,
        })
        .collect();

    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        data,
        history: HistoryView {
            temperatures: snapshot.iter().map(|r| r.temperature).collect(),
            efficiencies: snapshot.iter().map(|r| r.efficiency).collect(),
        },
        notifications,
    })
}
