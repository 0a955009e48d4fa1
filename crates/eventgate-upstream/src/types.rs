//! Payload types exchanged with upstream collaborators.
//!
//! The gateway does not interpret credentials or events. Both are opaque
//! JSON objects that are relayed as-is.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The body of a login request.
///
/// Any JSON object is accepted. Values are never printed by `Debug`, so
/// credentials can be traced without leaking secrets.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials(Map<String, Value>);

impl Credentials {
    /// Iterate over the field names.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.keys().map(|k| (k, "<redacted>")))
            .finish()
    }
}

/// The payload returned by a successful login, relayed verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoginResponse(Value);

impl LoginResponse {
    /// Wrap a JSON value.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Borrow the JSON payload.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }
}

/// A single event, relayed verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event(Map<String, Value>);

impl Event {
    /// Look up a field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// What the caller asked for on `GET /events`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    raw_query: Option<String>,
    authorization: Option<String>,
}

impl EventQuery {
    /// Create an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the raw query string (without the leading `?`).
    #[must_use]
    pub fn with_raw_query(mut self, raw_query: impl Into<String>) -> Self {
        let raw_query = raw_query.into();
        self.raw_query = (!raw_query.is_empty()).then_some(raw_query);
        self
    }

    /// Attach the caller's `Authorization` header value.
    #[must_use]
    pub fn with_authorization(mut self, authorization: impl Into<String>) -> Self {
        self.authorization = Some(authorization.into());
        self
    }

    /// The raw query string, if any.
    #[must_use]
    pub fn raw_query(&self) -> Option<&str> {
        self.raw_query.as_deref()
    }

    /// The caller's `Authorization` header value, if any.
    #[must_use]
    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }
}

impl fmt::Debug for EventQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQuery")
            .field("raw_query", &self.raw_query)
            .field(
                "authorization",
                &self.authorization.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
