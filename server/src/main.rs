//! Page Relay Server - Main Entry Point

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use relay_server::{api, config, messenger::GraphApiClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relay_server=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        app_id = config.app_id.as_deref().unwrap_or("-"),
        "Starting Page Relay Server"
    );

    // Outbound Send API client
    let messenger = GraphApiClient::new(&config).context("Failed to build Graph API client")?;

    // Build application state
    let state = api::AppState::new(config.clone(), Arc::new(messenger));
    let sweeper = state.spawn_sweeper();
    info!(
        interval_secs = config.sweep_interval_secs,
        timeout_secs = config.connection_timeout_secs,
        "Liveness sweeper started"
    );

    // Build router
    let app = api::create_router(state.clone());

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;
    info!(address = %config.bind_address, "Server listening");

    // Graceful shutdown handler
    let shutdown_state = state.clone();
    let shutdown_signal = async move {
        wait_for_signal().await;
        info!("Received shutdown signal, cleaning up...");
        let closed = shutdown_state.begin_shutdown();
        info!(closed, "Closed WebSocket connections");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    // Covers a server error before any signal arrived
    state.begin_shutdown();
    if let Err(e) = sweeper.await {
        warn!(error = %e, "Liveness sweeper ended abnormally");
    }

    info!("Server shutdown complete");

    Ok(())
}

/// Resolve on Ctrl-C or, on Unix, SIGTERM.
async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
