//! Core types and utilities for eventgate.
//!
//! This crate provides the foundational types used throughout the gateway:
//!
//! - **Origins**: Normalized browser origins and the cross-origin policy built from them
//! - **Identifiers**: Strongly-typed request IDs
//! - **Error types**: Common error definitions shared across crates
//!
//! # Example
//!
//! ```
//! use eventgate_core::{Origin, OriginPolicy, RequestId};
//!
//! // Parse an origin from configuration
//! let origin: Origin = "https://App.Example.com:443".parse().unwrap();
//! assert_eq!(origin.to_string(), "https://app.example.com");
//!
//! // Build a restricted policy from an allow-list
//! let policy = OriginPolicy::from_list(["https://app.example.com"]).unwrap();
//! assert!(policy.allows("https://app.example.com"));
//! assert!(!policy.allows("https://evil.example.com"));
//!
//! // Generate a request ID
//! let request_id = RequestId::generate();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;
pub mod origin;

pub use error::{CoreError, Result};
pub use ids::{IdError, RequestId};
pub use origin::{Origin, OriginPolicy};
