//! Server lifecycle.
//!
//! A [`GatewayServer`] owns the bound listener and the router. Running it
//! serves requests until a [`ShutdownHandle`] is triggered, then drains
//! in-flight requests for at most the configured drain timeout. Requests
//! still running at the deadline are cancelled: their handlers are dropped
//! and the caller receives `503 shutting_down`.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::config::{ConfigError, GatewayConfig};
use crate::routes::create_router;
use crate::state::{CancelSignal, GatewayState};

/// How long cancelled connections get to flush their response.
const CANCEL_GRACE: Duration = Duration::from_secs(1);

/// Errors raised while starting or running the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The listen address could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The requested address.
        addr: String,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// An I/O error while serving.
    #[error("server error: {0}")]
    Io(#[from] io::Error),

    /// The serve task panicked or was cancelled.
    #[error("server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A collaborator could not be created.
    #[error(transparent)]
    Upstream(#[from] eventgate_upstream::UpstreamError),
}

/// Triggers a graceful shutdown of a running [`GatewayServer`].
#[derive(Debug, Clone)]
pub struct ShutdownHandle(Arc<watch::Sender<bool>>);

impl ShutdownHandle {
    /// Request shutdown. Idempotent.
    pub fn shutdown(&self) {
        self.0.send_replace(true);
    }

    /// Whether shutdown has been requested.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        *self.0.borrow()
    }
}

/// A bound gateway, ready to serve.
pub struct GatewayServer {
    listener: TcpListener,
    router: Router,
    drain_timeout: Duration,
    shutdown: Arc<watch::Sender<bool>>,
    cancel: CancelSignal,
}

impl GatewayServer {
    /// Build the collaborators named by `config` and bind its listen address.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Config` if the CORS origin list is invalid,
    /// `GatewayError::Upstream` if a collaborator cannot be created, or
    /// `GatewayError::Bind` if the address cannot be bound.
    pub async fn from_config(config: GatewayConfig) -> Result<Self, GatewayError> {
        config.origin_policy()?;

        let authenticator = config.upstream.authenticator()?;
        let events = config.upstream.event_source()?;

        Self::bind(GatewayState::new(authenticator, events, config)).await
    }

    /// Bind the configured listen address.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Bind` if the address cannot be bound.
    pub async fn bind(state: GatewayState) -> Result<Self, GatewayError> {
        let addr = state.config.listen_addr.clone();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| GatewayError::Bind { addr, source })?;

        let drain_timeout = state.config.drain_timeout();
        let cancel = state.cancel.clone();
        let (shutdown, _) = watch::channel(false);

        Ok(Self {
            listener,
            router: create_router(state),
            drain_timeout,
            shutdown: Arc::new(shutdown),
            cancel,
        })
    }

    /// The address the listener is bound to.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket address cannot be read.
    pub fn local_addr(&self) -> Result<SocketAddr, GatewayError> {
        Ok(self.listener.local_addr()?)
    }

    /// A handle that stops this server.
    #[must_use]
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle(Arc::clone(&self.shutdown))
    }

    /// Serve until shutdown is requested and in-flight requests drain.
    ///
    /// Requests still running when the drain timeout expires are cancelled
    /// and answered with `503 shutting_down`. Connections that have not closed
    /// shortly after that are abandoned.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails while serving.
    pub async fn run(self) -> Result<(), GatewayError> {
        let Self {
            listener,
            router,
            drain_timeout,
            shutdown,
            cancel,
        } = self;

        let addr = listener.local_addr()?;
        tracing::info!(listen_addr = %addr, "Gateway listening");

        let serve = axum::serve(listener, router)
            .with_graceful_shutdown(stop_requested(shutdown.subscribe()));
        let mut task = tokio::spawn(async move { serve.await });

        tokio::select! {
            result = &mut task => {
                result??;
                tracing::info!("Gateway stopped");
                return Ok(());
            }
            () = stop_requested(shutdown.subscribe()) => {}
        }

        tracing::info!(
            drain_timeout_seconds = drain_timeout.as_secs(),
            "Shutdown requested, draining in-flight requests"
        );

        if let Ok(result) = tokio::time::timeout(drain_timeout, &mut task).await {
            result??;
        } else {
            tracing::warn!("Drain timeout expired, cancelling in-flight requests");
            cancel.cancel();

            match tokio::time::timeout(CANCEL_GRACE, &mut task).await {
                Ok(result) => result??,
                Err(_) => {
                    tracing::warn!("Connections still open after cancellation, abandoning them");
                    task.abort();
                }
            }
        }

        tracing::info!("Gateway stopped");
        Ok(())
    }
}

async fn stop_requested(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

/// Resolves on SIGINT, or SIGTERM on unix.
pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c().await.ok();
    };
    #[cfg(unix)]
    let term = async {
        if let Ok(mut s) = signal::unix::signal(signal::unix::SignalKind::terminate()) {
            s.recv().await;
        }
    };
    #[cfg(not(unix))]
    let term = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = term => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use eventgate_upstream::{UnconfiguredAuthenticator, UnconfiguredEventSource};

    fn state(listen_addr: &str) -> GatewayState {
        GatewayState::new(
            Arc::new(UnconfiguredAuthenticator),
            Arc::new(UnconfiguredEventSource),
            GatewayConfig {
                listen_addr: listen_addr.to_string(),
                drain_timeout_seconds: 1,
                ..GatewayConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn binds_ephemeral_port() {
        let server = GatewayServer::bind(state("127.0.0.1:0")).await.unwrap();
        assert_ne!(server.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn bind_failure_names_address() {
        let err = GatewayServer::bind(state("not-an-address"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, GatewayError::Bind { ref addr, .. } if addr == "not-an-address"));
    }

    #[tokio::test]
    async fn invalid_origin_list_is_a_config_error() {
        let config = GatewayConfig {
            listen_addr: "127.0.0.1:0".to_string(),
            cors_origins: vec!["not an origin".to_string()],
            ..GatewayConfig::default()
        };
        let err = GatewayServer::from_config(config).await.err().unwrap();
        assert!(matches!(err, GatewayError::Config(ConfigError::InvalidOrigin(_))));
    }

    #[tokio::test]
    async fn from_config_binds_with_fallback_collaborators() {
        let config = GatewayConfig {
            listen_addr: "127.0.0.1:0".to_string(),
            ..GatewayConfig::default()
        };
        let server = GatewayServer::from_config(config).await.unwrap();
        assert!(server.local_addr().unwrap().ip().is_loopback());
    }

    #[tokio::test]
    async fn shutdown_before_run_stops_immediately() {
        let server = GatewayServer::bind(state("127.0.0.1:0")).await.unwrap();
        let handle = server.shutdown_handle();
        handle.shutdown();
        handle.shutdown();
        assert!(handle.is_shutdown());

        tokio::time::timeout(Duration::from_secs(5), server.run())
            .await
            .unwrap()
            .unwrap();
    }
}
