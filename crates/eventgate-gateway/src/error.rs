//! API error types and responses.
//!
//! This module defines the standard error format for all API responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use eventgate_upstream::UpstreamError;

/// API error type that implements `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request body or parameters.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The credentials were refused.
    #[error("unauthorized")]
    Unauthorized,

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request body exceeds the configured limit.
    #[error("payload too large")]
    PayloadTooLarge,

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    RequestTimeout,

    /// Too many requests, rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// Internal server error. The message must not carry internal detail.
    #[error("internal error: {0}")]
    Internal(String),

    /// The operation has no collaborator configured.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// The upstream collaborator is not reachable.
    #[error("upstream unavailable")]
    UpstreamUnavailable,

    /// The request was cancelled because the server stopped draining.
    #[error("server is shutting down")]
    ShuttingDown,
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

/// Error details.
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            Self::UpstreamUnavailable | Self::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get the error code string for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::PayloadTooLarge => "payload_too_large",
            Self::RequestTimeout => "request_timeout",
            Self::RateLimited => "rate_limited",
            Self::Internal(_) => "internal_error",
            Self::NotImplemented(_) => "not_implemented",
            Self::UpstreamUnavailable => "upstream_unavailable",
            Self::ShuttingDown => "shutting_down",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::PayloadTooLarge;
        }
        Self::BadRequest(rejection.body_text())
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::NotConfigured(what) => {
                Self::NotImplemented(format!("no {what} service is configured"))
            }
            UpstreamError::Rejected(message) => Self::BadRequest(message),
            UpstreamError::Unauthorized => Self::Unauthorized,
            UpstreamError::NotFound => Self::NotFound("upstream resource".to_string()),
            UpstreamError::RateLimited => Self::RateLimited,
            UpstreamError::Unavailable(ref detail) => {
                tracing::warn!(error = %detail, "Upstream unavailable");
                Self::UpstreamUnavailable
            }
            UpstreamError::InvalidResponse(_)
            | UpstreamError::Unexpected(_)
            | UpstreamError::Internal(_) => {
                tracing::error!(error = %err, "Upstream internal error");
                Self::Internal("upstream service error".to_string())
            }
        }
    }
}
