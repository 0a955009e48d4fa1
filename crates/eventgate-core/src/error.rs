//! Common error types for eventgate.
//!
//! This module provides shared error types that are used across multiple crates.

use thiserror::Error;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core errors that can occur throughout the gateway.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An origin string could not be parsed.
    #[error("invalid origin {origin:?}: {reason}")]
    InvalidOrigin {
        /// The rejected input.
        origin: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}
