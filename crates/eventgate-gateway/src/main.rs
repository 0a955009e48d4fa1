//! Eventgate Gateway - HTTP API Gateway
//!
//! This is the main entry point for the gateway service.
//!
//! # Upstreams
//!
//! Set `LOGIN_UPSTREAM_URL` and `EVENTS_UPSTREAM_URL` to forward the two
//! endpoints. An unset URL makes its endpoint answer `501 Not Implemented`.
//!
//! # Cross-origin policy
//!
//! `CORS_ORIGINS` is a comma-separated allow-list. `CORS_ORIGINS=*` reflects
//! every origin. When unset, no origin is allowed.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eventgate_gateway::{shutdown_signal, GatewayConfig, GatewayServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,eventgate=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Eventgate Gateway");

    // Load configuration from environment
    let config = GatewayConfig::from_env()?;
    let policy = config.origin_policy()?;

    tracing::info!(
        listen_addr = %config.listen_addr,
        cors_origins = %policy,
        max_body_bytes = config.max_body_bytes,
        request_timeout_seconds = config.request_timeout_seconds,
        drain_timeout_seconds = config.drain_timeout_seconds,
        login_upstream = ?config.upstream.login_url,
        events_upstream = ?config.upstream.events_url,
        "Gateway configuration loaded"
    );

    if policy.is_permissive() {
        tracing::warn!("CORS_ORIGINS=* - every origin is reflected with credentials allowed");
    }

    // Build collaborators and start HTTP server
    let server = GatewayServer::from_config(config).await?;
    let shutdown = server.shutdown_handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received");
        shutdown.shutdown();
    });

    server.run().await?;

    Ok(())
}
