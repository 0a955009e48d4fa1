//! HTTP request handlers.
//!
//! This module contains all the endpoint handlers for the gateway API.

pub mod auth;
pub mod events;
pub mod health;

use axum::http::{Method, Uri};

use crate::error::ApiError;

/// Fallback for unknown paths and for unsupported methods on known paths.
pub async fn not_found(method: Method, uri: Uri) -> ApiError {
    tracing::debug!(%method, path = %uri.path(), "No route");
    ApiError::NotFound(format!("no route for {method} {}", uri.path()))
}
