//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Request, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::request::Parts;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::limit::{RequestBodyLimitLayer, ResponseBody};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use eventgate_core::OriginPolicy;

use crate::error::ApiError;
use crate::handlers::{auth, events, health, not_found};
use crate::request_id::{MakeUuidRequestId, REQUEST_ID_HEADER};
use crate::state::GatewayState;

/// Create the gateway router with all routes and middleware.
///
/// # Routes
///
/// - `GET /health` - Health check
/// - `POST /auth/login` - Delegate a login to the authenticator
/// - `GET /events` - Delegate an event listing to the event source
///
/// Every other path, and every other method on these paths, answers
/// `404 not_found`.
///
/// Body-limit and timeout rejections use the same JSON error body as the
/// handlers. An invalid `cors_origins` list falls back to the restrictive
/// default policy.
pub fn create_router(state: GatewayState) -> Router {
    // Extract config values before moving state
    let policy = state.config.origin_policy().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid CORS configuration, allowing no origins");
        OriginPolicy::default()
    });
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout = state.config.request_timeout();

    let state = Arc::new(state);

    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeUuidRequestId))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<axum::body::Body>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default();
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id,
                )
            },
        ))
        .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
        .layer(build_cors_layer(&policy))
        .map_response(rejection_to_api_error)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(request_timeout));

    Router::new()
        .route("/health", get(health::health).fallback(not_found))
        .route("/auth/login", post(auth::login).fallback(not_found))
        .route("/events", get(events::list_events).fallback(not_found))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            cancel_on_shutdown,
        ))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(middleware)
        .with_state(state)
}

/// Render middleware rejections as `ApiError` bodies.
///
/// `RequestBodyLimitLayer` answers an oversized `content-length` with a plain
/// text 413 and `TimeoutLayer` answers with an empty 408. Handler errors
/// already carry a JSON body and pass through.
fn rejection_to_api_error(response: Response<ResponseBody<Body>>) -> Response {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));

    match response.status() {
        StatusCode::PAYLOAD_TOO_LARGE if !is_json => ApiError::PayloadTooLarge.into_response(),
        StatusCode::REQUEST_TIMEOUT if !is_json => {
            tracing::warn!("Request timed out");
            ApiError::RequestTimeout.into_response()
        }
        _ => response.map(Body::new),
    }
}

/// Race the request against the server's cancel signal.
async fn cancel_on_shutdown(
    State(state): State<Arc<GatewayState>>,
    request: Request,
    next: Next,
) -> Response {
    tokio::select! {
        response = next.run(request) => response,
        () = state.cancel.cancelled() => {
            tracing::warn!("Request cancelled at drain deadline");
            ApiError::ShuttingDown.into_response()
        }
    }
}

/// Build the CORS layer for an origin policy.
///
/// The permissive policy reflects the caller's origin, methods and headers
/// and allows credentials. The restricted policy only echoes listed origins.
fn build_cors_layer(policy: &OriginPolicy) -> CorsLayer {
    if policy.is_permissive() {
        return CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true)
            .expose_headers([REQUEST_ID_HEADER]);
    }

    let policy = policy.clone();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin.to_str().is_ok_and(|o| policy.allows(o))
            },
        ))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, REQUEST_ID_HEADER])
        .expose_headers([REQUEST_ID_HEADER])
}
