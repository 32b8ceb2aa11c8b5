use std::io::IsTerminal;
use std::sync::Arc;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn, error, debug};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod handlers;
mod models;
mod services;
mod utils;

use api::wise::WiseClient;
use config::{Cli, Config};
use handlers::AppState;
use utils::AccessGate;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("wise_balances=info,tower_http=info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_from(config::normalize_args(std::env::args_os()));
    let config = match Config::load(cli) {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!("Starting wise-balances v{}", env!("CARGO_PKG_VERSION"));
    debug!("Configuration: {:?}", config);

    if config.gate == AccessGate::Open {
        warn!("Serving without a user_token check, anyone who can reach the port can read balances");
    }
    if config.log_raw_body {
        warn!("Raw Wise responses are logged at debug level and contain account balances");
    }

    let client = WiseClient::with_base_url(
        config.api_key.clone(),
        config.profile_id.clone(),
        config.api_base.clone(),
    )
    .log_raw_body(config.log_raw_body);

    let state = AppState::new(Arc::new(client), config.gate.clone());
    let app = handlers::router(state);

    let listener = match TcpListener::bind(config.listen_addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind {}: {}", config.listen_addr, e);
            std::process::exit(1);
        }
    };

    info!("Starting server on {}", config.listen_addr);
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    info!("Server stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
