//! Gateway application state.
//!
//! This module defines the shared state that is available to all request handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use eventgate_upstream::{Authenticator, EventSource};

use crate::config::GatewayConfig;

/// Shared application state for the gateway.
///
/// This struct holds references to all collaborators needed by the HTTP handlers.
/// Collaborators are trait objects because the configured upstreams decide at
/// startup which implementation serves each route.
#[derive(Clone)]
pub struct GatewayState {
    /// Verifies login credentials.
    pub authenticator: Arc<dyn Authenticator>,
    /// Lists events.
    pub events: Arc<dyn EventSource>,
    /// Gateway configuration.
    pub config: GatewayConfig,
    /// When this state was created.
    pub started_at: DateTime<Utc>,
    /// Cancels every request still in flight.
    pub cancel: CancelSignal,
}

impl GatewayState {
    /// Create a new gateway state.
    #[must_use]
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        events: Arc<dyn EventSource>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            authenticator,
            events,
            config,
            started_at: Utc::now(),
            cancel: CancelSignal::new(),
        }
    }
}

/// One-way switch that aborts in-flight requests.
///
/// The server fires it when the drain timeout expires. Requests running at
/// that point stop their handler and answer `503 shutting_down`.
#[derive(Debug, Clone)]
pub struct CancelSignal(Arc<watch::Sender<bool>>);

impl CancelSignal {
    /// Create a signal that has not fired.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self(Arc::new(tx))
    }

    /// Fire the signal. Idempotent.
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }

    /// Whether the signal has fired.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once the signal has fired.
    pub async fn cancelled(&self) {
        let mut rx = self.0.subscribe();
        let _ = rx.wait_for(|fired| *fired).await;
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn cancelled_resolves_after_cancel() {
        let signal = CancelSignal::new();
        assert!(!signal.is_cancelled());

        let waiter = signal.clone();
        let task = tokio::spawn(async move { waiter.cancelled().await });

        signal.cancel();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
        assert!(signal.is_cancelled());

        // Already fired: resolves immediately.
        signal.cancelled().await;
    }
}
