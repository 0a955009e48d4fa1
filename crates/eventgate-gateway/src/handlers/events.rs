//! Events endpoint.

use std::sync::Arc;

use axum::extract::{RawQuery, State};
use axum::Json;
use serde::Serialize;

use eventgate_upstream::{Event, EventQuery};

use crate::auth::CallerAuthorization;
use crate::error::ApiError;
use crate::state::GatewayState;

/// Response body for `GET /events`.
#[derive(Debug, Serialize)]
pub struct EventsResponse {
    /// The events returned by the event source.
    pub events: Vec<Event>,
}

/// List events through the configured event source.
///
/// The query string is forwarded verbatim together with the caller's
/// `Authorization` header.
pub async fn list_events(
    State(state): State<Arc<GatewayState>>,
    RawQuery(raw_query): RawQuery,
    CallerAuthorization(authorization): CallerAuthorization,
) -> Result<Json<EventsResponse>, ApiError> {
    let mut query = EventQuery::new();
    if let Some(raw) = raw_query {
        query = query.with_raw_query(raw);
    }
    if let Some(authorization) = authorization {
        query = query.with_authorization(authorization);
    }

    let events = state.events.list_events(query).await?;

    tracing::debug!(count = events.len(), "Events listed");
    Ok(Json(EventsResponse { events }))
}
