//! Health check endpoint.
//!
//! This module provides the public health check endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::GatewayState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// When the gateway started.
    pub started_at: DateTime<Utc>,
}

/// Health check handler.
///
/// Returns the current service status. It does not contact the upstream
/// collaborators.
///
/// # Example
///
/// ```text
/// GET /health
///
/// Response: 200 OK
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "started_at": "2024-01-01T00:00:00Z"
/// }
/// ```
pub async fn health(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        started_at: state.started_at,
    };

    (StatusCode::OK, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use eventgate_upstream::{UnconfiguredAuthenticator, UnconfiguredEventSource};

    #[tokio::test]
    async fn health_returns_ok() {
        let state = Arc::new(GatewayState::new(
            Arc::new(UnconfiguredAuthenticator),
            Arc::new(UnconfiguredEventSource),
            GatewayConfig::default(),
        ));
        let response = health(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
