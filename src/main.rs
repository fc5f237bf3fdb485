//! Scale-to-zero demo host.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request       ┌──────────────────────────────────────────────┐
//!     ─────────────────────┼─▶ TraceLayer ─▶ track_activity ─▶ handlers   │
//!                          │                      │                       │
//!                          │                      ▼                       │
//!                          │              ActivityMonitor                 │
//!                          │                      ▲                       │
//!                          │                      │ every 1s              │
//!                          │               WatchdogLoop ──▶ ShutdownSequence ──▶ hook
//!                          │                                      │       │
//!                          │                                      ▼       │
//!                          │                                   exit(0)    │
//!                          └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use scale_to_zero::config::{load_plugin_config, RawConfig, DEFAULT_NAMESPACE};
use scale_to_zero::observability::{init_logging, logging::DEFAULT_FILTER};
use scale_to_zero::{HttpServer, ScaleToZero, WatchdogOptions};

#[derive(Parser)]
#[command(name = "scale-to-zero")]
#[command(about = "HTTP server that exits when it stops receiving traffic", long_about = None)]
struct Cli {
    /// Host config file (TOML); plugin settings under [plugins.<namespace>]
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, default_value = "127.0.0.1:8001")]
    bind: String,

    #[arg(long, default_value = DEFAULT_NAMESPACE)]
    namespace: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(DEFAULT_FILTER);

    tracing::info!("scale-to-zero v{} starting", env!("CARGO_PKG_VERSION"));

    let raw = match &cli.config {
        Some(path) => load_plugin_config(path, &cli.namespace)?,
        None => RawConfig::new(),
    };

    // Fail fast: a bad plugin config aborts before anything is served.
    let options = WatchdogOptions::default().with_namespace(cli.namespace.clone());
    let watchdog = ScaleToZero::startup(&raw, options).inspect_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
    })?;

    tracing::info!(
        idle_duration_secs = ?watchdog.config().idle_duration_secs,
        max_age_secs = ?watchdog.config().max_age_secs,
        shutdown_url = ?watchdog.config().shutdown_url,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&cli.bind).await?;
    let server = HttpServer::new(watchdog);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
