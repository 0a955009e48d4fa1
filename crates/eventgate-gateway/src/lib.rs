//! HTTP gateway for the eventgate login and events API.
//!
//! This crate provides the public-facing API. It handles:
//!
//! - Routing `POST /auth/login` and `GET /events` to upstream collaborators
//! - The cross-origin policy for browser callers
//! - Request ids, body limits and timeouts
//! - Graceful start, drain and stop of the listener
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Browser clients                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    eventgate-gateway                        │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐    │
//! │  │ CORS +      │ │   Router    │ │   GatewayServer     │    │
//! │  │ request ids │ │  + Handlers │ │   (drain / stop)    │    │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                     ┌────────┴────────┐
//!                     ▼                 ▼
//!              ┌──────────────┐  ┌──────────────┐
//!              │ Authenticator│  │ EventSource  │
//!              └──────────────┘  └──────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use eventgate_gateway::{GatewayConfig, GatewayServer};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GatewayConfig::from_env()?;
//! let server = GatewayServer::from_config(config).await?;
//! let shutdown = server.shutdown_handle();
//! tokio::spawn(async move {
//!     eventgate_gateway::shutdown_signal().await;
//!     shutdown.shutdown();
//! });
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod request_id;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{ConfigError, GatewayConfig};
pub use error::ApiError;
pub use routes::create_router;
pub use server::{shutdown_signal, GatewayError, GatewayServer, ShutdownHandle};
pub use state::{CancelSignal, GatewayState};

// Re-export key types for convenience
pub use auth::CallerAuthorization;
