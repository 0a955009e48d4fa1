//! Upstream collaborators for eventgate.
//!
//! The gateway never verifies credentials or stores events itself. Both
//! concerns are delegated to collaborators behind two traits:
//!
//! - [`Authenticator`] answers `POST /auth/login`
//! - [`EventSource`] answers `GET /events`
//!
//! Each trait has an HTTP-forwarding implementation and an "unconfigured"
//! implementation that fails fast with [`UpstreamError::NotConfigured`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │   Gateway        │────▶│  Authenticator   │──▶ HttpAuthenticator ──▶ login service
//! │   (HTTP)         │     │  (trait)         │──▶ UnconfiguredAuthenticator
//! │                  │     └──────────────────┘
//! │                  │     ┌──────────────────┐
//! │                  │────▶│  EventSource     │──▶ HttpEventSource ──▶ events service
//! │                  │     │  (trait)         │──▶ UnconfiguredEventSource
//! └──────────────────┘     └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use eventgate_upstream::{Authenticator, Credentials, UpstreamConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = UpstreamConfig {
//!     login_url: Some("https://identity.internal/login".to_string()),
//!     events_url: None,
//!     timeout_seconds: 30,
//! };
//!
//! let authenticator = config.authenticator()?;
//!
//! let body = serde_json::json!({ "user": "a", "pass": "b" });
//! let credentials: Credentials = serde_json::from_value(body)?;
//! let response = authenticator.login(credentials).await?;
//! println!("{}", response.as_value());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod events;
mod http;
pub mod login;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

pub use error::{Result, UpstreamError};
pub use events::{EventSource, HttpEventSource, UnconfiguredEventSource};
pub use login::{Authenticator, HttpAuthenticator, UnconfiguredAuthenticator};
pub use types::{Credentials, Event, EventQuery, LoginResponse};

#[cfg(any(test, feature = "test-utils"))]
pub use events::MockEventSource;
#[cfg(any(test, feature = "test-utils"))]
pub use login::MockAuthenticator;

/// Where the upstream collaborators live.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Login endpoint. `None` leaves `/auth/login` unconfigured.
    #[serde(default)]
    pub login_url: Option<String>,
    /// Events endpoint. `None` leaves `/events` unconfigured.
    #[serde(default)]
    pub events_url: Option<String>,
    /// Timeout for each upstream request, in seconds.
    #[serde(default = "UpstreamConfig::default_timeout")]
    pub timeout_seconds: u64,
}

impl UpstreamConfig {
    const fn default_timeout() -> u64 {
        30
    }

    /// Get the upstream request timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Build the authenticator selected by this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn authenticator(&self) -> Result<Arc<dyn Authenticator>> {
        match &self.login_url {
            Some(url) => {
                tracing::info!(login_url = %url, "Login upstream configured");
                Ok(Arc::new(HttpAuthenticator::new(url.clone(), self.timeout())?))
            }
            None => {
                tracing::warn!("No login upstream configured - /auth/login will answer 501");
                Ok(Arc::new(UnconfiguredAuthenticator))
            }
        }
    }

    /// Build the event source selected by this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn event_source(&self) -> Result<Arc<dyn EventSource>> {
        match &self.events_url {
            Some(url) => {
                tracing::info!(events_url = %url, "Events upstream configured");
                Ok(Arc::new(HttpEventSource::new(url.clone(), self.timeout())?))
            }
            None => {
                tracing::warn!("No events upstream configured - /events will answer 501");
                Ok(Arc::new(UnconfiguredEventSource))
            }
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            login_url: None,
            events_url: None,
            timeout_seconds: Self::default_timeout(),
        }
    }
}
