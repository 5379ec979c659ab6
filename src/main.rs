//! DPN Monitor - diabetic peripheral neuropathy telemetry service
//!
//! Receives biosignal readings from a wearable sensing device, classifies
//! them against clinical bands, and serves the latest state, trend analytics
//! and a short risk narrative to the monitoring dashboard.
//!
//! # Usage
//!
//! ```bash
//! # Run the service (default subcommand)
//! cargo run --release
//!
//! # Watch a running service from the terminal, the way the dashboard does
//! cargo run --release -- watch --url http://localhost:4000
//!
//! # Feed it synthetic readings
//! cargo run --release --bin device-sim -- --scenario warning
//! ```
//!
//! # Environment Variables
//!
//! - `DPN_CONFIG`: Path to the monitor configuration TOML
//! - `DPN_SERVER_ADDR`: Override the listen address (default: 0.0.0.0:4000)
//! - `GEMINI_API_KEY`: Enables AI narratives; without it narratives are rule-based
//! - `SENSOR_CORS_ORIGINS`: Comma-separated allowed origins (default: any)
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use dpn_monitor::api::{create_app, DashboardState};
use dpn_monitor::config::{self, defaults, MonitorConfig, StorageBackend};
use dpn_monitor::llm::NarrativeGenerator;
use dpn_monitor::monitor::DashboardPoller;
use dpn_monitor::pipeline::AppState;
use dpn_monitor::storage::{self, ProcessLock};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "dpn-monitor")]
#[command(about = "DPN biosignal telemetry service")]
#[command(version)]
struct CliArgs {
    /// Override the server address (default: "0.0.0.0:4000")
    #[arg(short, long, env = defaults::SERVER_ADDR_ENV)]
    addr: Option<String>,

    #[command(subcommand)]
    command: Option<SubCommand>,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Run the HTTP service (default)
    Serve,

    /// Poll a running service and log assessments and narratives
    Watch {
        /// Base URL of the service
        #[arg(long, default_value = "http://localhost:4000")]
        url: String,
    },
}

// ============================================================================
// Task Supervision
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum TaskName {
    HttpServer,
    DashboardPoller,
}

impl std::fmt::Display for TaskName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskName::HttpServer => write!(f, "HttpServer"),
            TaskName::DashboardPoller => write!(f, "DashboardPoller"),
        }
    }
}

async fn run_supervisor(
    task_set: &mut JoinSet<Result<TaskName>>,
    cancel_token: CancellationToken,
) -> Result<()> {
    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                info!("Supervisor: shutdown signal received");
                break;
            }
            result = task_set.join_next() => {
                match result {
                    Some(Ok(Ok(task_name))) => {
                        info!("Supervisor: task {} completed normally", task_name);
                    }
                    Some(Ok(Err(e))) => {
                        error!("Supervisor: task failed with error: {}", e);
                        cancel_token.cancel();
                        return Err(e);
                    }
                    Some(Err(e)) => {
                        error!("Supervisor: task panicked: {}", e);
                        cancel_token.cancel();
                        return Err(anyhow::anyhow!("Task panicked: {}", e));
                    }
                    None => {
                        info!("Supervisor: all tasks completed");
                        break;
                    }
                }
            }
        }
    }

    // Let the remaining tasks observe cancellation and drain
    while let Some(result) = task_set.join_next().await {
        if let Ok(Ok(task_name)) = result {
            info!("Supervisor: task {} stopped", task_name);
        }
    }

    Ok(())
}

// ============================================================================
// Serve
// ============================================================================

/// Spawn the HTTP server task into the JoinSet.
fn spawn_http_server(
    task_set: &mut JoinSet<Result<TaskName>>,
    listener: tokio::net::TcpListener,
    app: axum::Router,
    cancel_token: CancellationToken,
) {
    task_set.spawn(async move {
        info!("[HttpServer] Task starting");

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel_token.cancelled().await;
                info!("[HttpServer] Received shutdown signal");
            })
            .await;

        match result {
            Ok(()) => {
                info!("[HttpServer] Graceful shutdown complete");
                Ok(TaskName::HttpServer)
            }
            Err(e) => {
                error!("[HttpServer] Server error: {}", e);
                Err(anyhow::anyhow!("HTTP server error: {}", e))
            }
        }
    });
}

async fn run_server(cfg: &MonitorConfig, server_addr: &str, cancel_token: CancellationToken) -> Result<()> {
    // Only the on-disk backend needs single-instance protection
    let _process_lock = match cfg.storage.backend {
        StorageBackend::Sled => {
            let data_dir = Path::new(&cfg.storage.path)
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            std::fs::create_dir_all(data_dir)
                .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
            Some(ProcessLock::acquire(data_dir)?)
        }
        StorageBackend::Memory => None,
    };

    let store = storage::open_store(&cfg.storage).context("Failed to open reading store")?;
    let recent = store.recent(cfg.history.capacity).unwrap_or_else(|e| {
        warn!(error = %e, "Could not load recent readings, history starts empty");
        Vec::new()
    });
    info!(
        backend = store.backend_name(),
        restored = recent.len(),
        "Reading store ready"
    );

    let app_state = Arc::new(RwLock::new(AppState::from_config(cfg, &recent)));
    let narrator = Arc::new(NarrativeGenerator::from_config(&cfg.narrative));
    info!(backend = narrator.backend_name(), "Narrative generator ready");

    let dashboard_state = DashboardState::new(app_state, store, narrator, cfg.bands);
    let app = create_app(dashboard_state);

    let listener = tokio::net::TcpListener::bind(server_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", server_addr))?;
    info!("HTTP server listening on {}", server_addr);

    let mut task_set: JoinSet<Result<TaskName>> = JoinSet::new();
    spawn_http_server(&mut task_set, listener, app, cancel_token.clone());
    run_supervisor(&mut task_set, cancel_token).await
}

// ============================================================================
// Watch
// ============================================================================

async fn run_watch(cfg: &MonitorConfig, url: String, cancel_token: CancellationToken) -> Result<()> {
    let poller = DashboardPoller::new(url, cfg.bands, cfg.history.capacity)
        .context("Failed to build HTTP client")?;

    let mut task_set: JoinSet<Result<TaskName>> = JoinSet::new();
    let poll_cancel = cancel_token.clone();
    task_set.spawn(async move {
        poller.run(poll_cancel).await;
        Ok(TaskName::DashboardPoller)
    });
    run_supervisor(&mut task_set, cancel_token).await
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    let monitor_config = MonitorConfig::load();
    config::init(monitor_config);
    let cfg = config::get();

    let server_addr = args.addr.unwrap_or_else(|| cfg.server.addr.clone());

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  DPN Monitor v{}", env!("CARGO_PKG_VERSION"));
    info!("  Biosignal telemetry for peripheral neuropathy risk");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    match args.command.unwrap_or(SubCommand::Serve) {
        SubCommand::Serve => run_server(cfg, &server_addr, cancel_token).await?,
        SubCommand::Watch { url } => run_watch(cfg, url, cancel_token).await?,
    }

    info!("DPN Monitor shutdown complete");
    Ok(())
}
