//! Request id generation for the `x-request-id` header.

use axum::http::{HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId as HeaderRequestId};

use eventgate_core::RequestId;

/// Header carrying the per-request id.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Generates a fresh UUID v4 [`RequestId`] for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeUuidRequestId;

impl MakeRequestId for MakeUuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<HeaderRequestId> {
        let id = RequestId::generate().to_string();
        HeaderValue::from_str(&id).ok().map(HeaderRequestId::new)
    }
}
