//! Login endpoint.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use eventgate_upstream::{Credentials, LoginResponse};

use crate::error::ApiError;
use crate::state::GatewayState;

/// Verify credentials through the configured authenticator.
///
/// The body must be a JSON object. Its fields are not interpreted here; they
/// are handed to the authenticator and its payload is returned as is.
///
/// ```text
/// POST /auth/login
/// {"user": "a", "pass": "b"}
///
/// Response: 200 OK with the authenticator's payload
/// ```
pub async fn login(
    State(state): State<Arc<GatewayState>>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(credentials) = payload?;

    let fields: Vec<&str> = credentials.field_names().collect();
    tracing::debug!(?fields, "Login requested");

    let response = state.authenticator.login(credentials).await?;

    tracing::info!("Login accepted");
    Ok(Json(response))
}
