//! Login delegation.
//!
//! The gateway forwards the login request body to an [`Authenticator`] and
//! relays whatever it answers.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Result, UpstreamError};
use crate::http;
use crate::types::{Credentials, LoginResponse};

/// Trait for verifying credentials.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Verify the credentials and return the login payload.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError::Unauthorized` if the credentials are refused,
    /// or another `UpstreamError` if the collaborator cannot answer.
    async fn login(&self, credentials: Credentials) -> Result<LoginResponse>;
}

/// Authenticator that forwards the credentials to a login service over HTTP.
///
/// The credentials are sent as the JSON body of a `POST` to the configured
/// URL. A 2xx answer's JSON body becomes the [`LoginResponse`].
pub struct HttpAuthenticator {
    url: String,
    client: reqwest::Client,
}

impl HttpAuthenticator {
    /// Create a new HTTP authenticator.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError::Internal` if the HTTP client cannot be created.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            url: url.into(),
            client: http::build_client(timeout)?,
        })
    }
}

#[async_trait]
impl Authenticator for HttpAuthenticator {
    async fn login(&self, credentials: Credentials) -> Result<LoginResponse> {
        tracing::debug!(url = %self.url, ?credentials, "Forwarding login");

        let response = self
            .client
            .post(&self.url)
            .json(&credentials)
            .send()
            .await
            .map_err(|e| http::transport_error(&e))?;

        http::read_json(response).await
    }
}

/// Authenticator used when no login service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredAuthenticator;

#[async_trait]
impl Authenticator for UnconfiguredAuthenticator {
    async fn login(&self, _credentials: Credentials) -> Result<LoginResponse> {
        Err(UpstreamError::NotConfigured("login"))
    }
}

/// A scripted authenticator for testing.
///
/// Every call returns the same outcome and the received credentials are
/// recorded for later inspection.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockAuthenticator {
    outcome: Result<LoginResponse>,
    calls: parking_lot::Mutex<Vec<Credentials>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockAuthenticator {
    /// An authenticator that accepts every login with this payload.
    #[must_use]
    pub fn succeeding(payload: serde_json::Value) -> Self {
        Self {
            outcome: Ok(LoginResponse::new(payload)),
            calls: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// An authenticator that fails every login with this error.
    #[must_use]
    pub fn failing(error: UpstreamError) -> Self {
        Self {
            outcome: Err(error),
            calls: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Credentials received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Credentials> {
        self.calls.lock().clone()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl Authenticator for MockAuthenticator {
    async fn login(&self, credentials: Credentials) -> Result<LoginResponse> {
        self.calls.lock().push(credentials);
        self.outcome.clone()
    }
}
