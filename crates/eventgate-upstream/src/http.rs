//! Shared HTTP plumbing for the upstream clients.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, UpstreamError};

/// Build the HTTP client used for upstream calls.
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| UpstreamError::Internal(format!("failed to create HTTP client: {e}")))
}

/// Map a transport-level failure.
pub(crate) fn transport_error(err: &reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Unavailable("request timed out".to_string())
    } else {
        UpstreamError::Unavailable(format!("request failed: {err}"))
    }
}

/// Error body shape commonly returned by upstream services.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<Value>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        if let Some(message) = self.message {
            return Some(message);
        }
        match self.error? {
            Value::String(s) => Some(s),
            Value::Object(mut obj) => match obj.remove("message") {
                Some(Value::String(s)) => Some(s),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Decode a successful response, or map the failure status.
pub(crate) async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();

    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| UpstreamError::InvalidResponse(e.to_string()));
    }

    Err(error_for_status(status, response).await)
}

async fn error_for_status(status: StatusCode, response: reqwest::Response) -> UpstreamError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(ErrorBody::into_message)
                .unwrap_or_else(|| "request rejected".to_string());
            UpstreamError::Rejected(message)
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => UpstreamError::Unauthorized,
        StatusCode::NOT_FOUND => UpstreamError::NotFound,
        StatusCode::TOO_MANY_REQUESTS => UpstreamError::RateLimited,
        s if s.is_server_error() => UpstreamError::Unavailable(format!("HTTP {s}")),
        s => UpstreamError::Unexpected(s.as_u16()),
    }
}
