//! exgen API gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!     Browser                     ┌──────────────────────────────────────────────┐
//!     ────────────────────────────┼─▶ http::server (request id, trace, timeout)  │
//!                                 │        │                                     │
//!                                 │        ├─ /api/v1/{*path} → http::gateway    │
//!                                 │        ├─ /api/proxy      → http::proxy      │
//!                                 │        └─ /healthz        (local)            │
//!                                 │        ▼                                     │
//!                                 │   routing::Dispatcher                        │
//!                                 │     security::headers (filter, credential)   │
//!                                 │        ▼                                     │
//!                                 │   forward::Forwarder ───────────────────────┼──▶ Backend
//!                                 │        ▼                                     │
//!     ◀───────────────────────────┼── http::response (passthrough | envelope)    │
//!                                 │                                              │
//!                                 │   config · observability · lifecycle         │
//!                                 └──────────────────────────────────────────────┘
//! ```
//!
//! Configuration: `GATEWAY_CONFIG` names an optional TOML file; `BACKEND_URL`,
//! `GATEWAY_BIND` and `GATEWAY_PROXY_TOKEN` override it.

use std::path::PathBuf;

use tokio::net::TcpListener;

use exgen_gateway::config::load_config;
use exgen_gateway::lifecycle::{signals, Shutdown};
use exgen_gateway::observability::{logging, metrics};
use exgen_gateway::HttpServer;

/// Environment variable naming the TOML config file.
const ENV_CONFIG_PATH: &str = "GATEWAY_CONFIG";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var_os(ENV_CONFIG_PATH).map(PathBuf::from);
    let config = load_config(config_path.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!("exgen-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = %config.backend.base_url,
        request_timeout_secs = config.timeouts.request_secs,
        upstream_timeout_secs = ?config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_signal(&signal_shutdown).await;
    });

    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
