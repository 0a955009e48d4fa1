//! Upstream error types.

use thiserror::Error;

/// A result type using `UpstreamError`.
pub type Result<T> = std::result::Result<T, UpstreamError>;

/// Errors that can occur while talking to an upstream collaborator.
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    /// No upstream is configured for this operation.
    #[error("{0} upstream is not configured")]
    NotConfigured(&'static str),

    /// The upstream refused the request as malformed.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The upstream refused the caller's credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// The upstream has no such resource.
    #[error("not found")]
    NotFound,

    /// Too many requests, rate limited by the upstream.
    #[error("rate limited")]
    RateLimited,

    /// The upstream could not be reached or failed.
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    /// The upstream answered with a body that could not be parsed.
    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),

    /// The upstream answered with a status this client does not understand.
    #[error("unexpected upstream status: {0}")]
    Unexpected(u16),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl UpstreamError {
    /// Returns `true` if the same request might succeed later.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::RateLimited)
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Rejected(_) => 400,
            Self::Unauthorized => 401,
            Self::NotFound => 404,
            Self::RateLimited => 429,
            Self::NotConfigured(_) => 501,
            Self::Unavailable(_) => 503,
            Self::InvalidResponse(_) | Self::Unexpected(_) | Self::Internal(_) => 500,
        }
    }
}
