//! Event retrieval delegation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;

use crate::error::{Result, UpstreamError};
use crate::http;
use crate::types::{Event, EventQuery};

/// Trait for listing events.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// List the events matching the query.
    ///
    /// # Errors
    ///
    /// Returns an `UpstreamError` if the collaborator refuses the query or
    /// cannot answer.
    async fn list_events(&self, query: EventQuery) -> Result<Vec<Event>>;
}

/// Accepted upstream answer shapes: a bare array or `{"events": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EventsPayload {
    Bare(Vec<Event>),
    Wrapped { events: Vec<Event> },
}

impl From<EventsPayload> for Vec<Event> {
    fn from(payload: EventsPayload) -> Self {
        match payload {
            EventsPayload::Bare(events) | EventsPayload::Wrapped { events } => events,
        }
    }
}

/// Event source that queries an events service over HTTP.
///
/// The caller's query string is appended to the configured URL verbatim and
/// the caller's `Authorization` header is forwarded.
pub struct HttpEventSource {
    url: String,
    client: reqwest::Client,
}

impl HttpEventSource {
    /// Create a new HTTP event source.
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

    fn request_url(&self, query: &EventQuery) -> String {
        match query.raw_query() {
            Some(raw) => {
                let separator = if self.url.contains('?') { '&' } else { '?' };
                format!("{}{separator}{raw}", self.url)
            }
            None => self.url.clone(),
        }
    }
}

#[async_trait]
impl EventSource for HttpEventSource {
    async fn list_events(&self, query: EventQuery) -> Result<Vec<Event>> {
        let url = self.request_url(&query);
        tracing::debug!(url = %url, "Fetching events");

        let mut request = self.client.get(&url);
        if let Some(authorization) = query.authorization() {
            request = request.header(AUTHORIZATION, authorization);
        }

        let response = request
            .send()
            .await
            .map_err(|e| http::transport_error(&e))?;

        let payload: EventsPayload = http::read_json(response).await?;
        Ok(payload.into())
    }
}

/// Event source used when no events service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredEventSource;

#[async_trait]
impl EventSource for UnconfiguredEventSource {
    async fn list_events(&self, _query: EventQuery) -> Result<Vec<Event>> {
        Err(UpstreamError::NotConfigured("events"))
    }
}

/// A scripted event source for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockEventSource {
    outcome: Result<Vec<Event>>,
    queries: parking_lot::Mutex<Vec<EventQuery>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockEventSource {
    /// An event source that always returns these events.
    #[must_use]
    pub fn with_events(events: Vec<Event>) -> Self {
        Self {
            outcome: Ok(events),
            queries: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// An event source that always fails with this error.
    #[must_use]
    pub fn failing(error: UpstreamError) -> Self {
        Self {
            outcome: Err(error),
            queries: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Queries received so far.
    #[must_use]
    pub fn queries(&self) -> Vec<EventQuery> {
        self.queries.lock().clone()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl EventSource for MockEventSource {
    async fn list_events(&self, query: EventQuery) -> Result<Vec<Event>> {
        self.queries.lock().push(query);
        self.outcome.clone()
    }
}
