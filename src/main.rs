//! Merchant BFF Gateway
//!
//! A backend-for-frontend gateway built with Tokio and Axum. It sits between
//! the merchant web application and the backend microservices and exposes
//! two surfaces:
//!
//! ```text
//!                          ┌──────────────────────────────────────────────┐
//!                          │                 DEALS GATEWAY                 │
//!                          │                                               │
//!   GET /api/config        │  ┌──────────┐   ┌──────────┐   ┌──────────┐  │
//!   ───────────────────────┼─▶│  http    │──▶│aggregator│──▶│ resolver │  │
//!                          │  │  server  │   │ + cache  │   │ fetcher  │──┼──▶ users-ms
//!                          │  └──────────┘   └──────────┘   └──────────┘──┼──▶ deals-ms
//!                          │                                               │
//!   /api/deals/*           │  ┌──────────┐   ┌──────────┐                 │
//!   ───────────────────────┼─▶│  http    │──▶│  proxy   │─────────────────┼──▶ deals-ms
//!                          │  │  server  │   │ forward  │                 │
//!                          │  └──────────┘   └──────────┘                 │
//!                          │                                               │
//!                          │  ┌─────────────────────────────────────────┐ │
//!                          │  │          Cross-Cutting Concerns          │ │
//!                          │  │  config │ observability │ lifecycle      │ │
//!                          │  └─────────────────────────────────────────┘ │
//!                          └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use deals_gateway::config::loader::load_config;
use deals_gateway::config::watcher::ConfigWatcher;
use deals_gateway::http::HttpServer;
use deals_gateway::lifecycle::Shutdown;
use deals_gateway::observability::{logging, metrics};
use deals_gateway::GatewayConfig;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "deals-gateway", about = "BFF gateway for the merchant web application")]
struct Args {
    /// Path to the gateway configuration file (TOML). Defaults apply if omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    logging::init_logging("deals_gateway=debug,tower_http=debug");

    tracing::info!("deals-gateway v0.1.0 starting");

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        services = config.services.len(),
        cache_ttl_secs = config.cache.ttl_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    // Watch the config file for hot reload when one was given.
    let (config_updates, _watcher) = match &args.config {
        Some(path) => {
            let (watcher, rx) = ConfigWatcher::new(path);
            let handle = watcher.run()?;
            (rx, Some(handle))
        }
        None => {
            let (_tx, rx) = mpsc::unbounded_channel();
            (rx, None)
        }
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::error!("Failed to install Ctrl+C handler");
            return;
        }
        tracing::info!("Shutdown signal received");
        shutdown.trigger();
    });

    let server = HttpServer::new(config);
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
