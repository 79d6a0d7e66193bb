//! FHIR validation proxy - server entry point.
//!
//! Loads configuration and the validation rule set, then serves the HTTP
//! surface until SIGINT/SIGTERM.

use anyhow::Context;
use fhirgate::{api::create_router, config::Config, logging, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first to get logging settings
    let config = Config::load().context("Failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    logging::init_logging(&config.logging);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting FHIR validation proxy"
    );

    let addr = config
        .socket_addr()
        .context("Failed to determine socket address")?;

    // Loader failures here are fatal: a proxy with no rule set must not start.
    let state = AppState::new(config).context("Failed to initialize application state")?;
    match &state.upstream {
        Some(upstream) => {
            tracing::info!(upstream = upstream.base_url(), "Upstream FHIR store configured")
        }
        None => tracing::info!("No upstream configured; running in validate-only mode"),
    }

    let app = create_router(state);

    tracing::info!("Listening on http://{addr}");
    tracing::info!("Health check: http://{addr}/health");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind TCP listener on {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server terminated unexpectedly")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
/// Docker sends SIGTERM, while Ctrl+C sends SIGINT
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm =
        signal(SignalKind::terminate()).expect("Failed to install SIGTERM signal handler");
    let sigint = tokio::signal::ctrl_c();

    tokio::select! {
        _ = sigint => {
            tracing::info!("SIGINT received, starting graceful shutdown...");
        }
        _ = sigterm.recv() => {
            tracing::info!("SIGTERM received, starting graceful shutdown...");
        }
    }
}

/// Wait for shutdown signal (SIGINT only on non-Unix platforms)
#[cfg(not(unix))]
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
