//! Caller credential extractors.
//!
//! The gateway does not validate bearer tokens itself. It only lifts the
//! caller's `Authorization` header out of the request so it can be forwarded
//! to the events collaborator.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::ApiError;

/// The caller's `Authorization` header, if one was sent.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CallerAuthorization(pub Option<String>);

impl std::fmt::Debug for CallerAuthorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = self.0.as_ref().map(|_| "<redacted>");
        f.debug_tuple("CallerAuthorization").field(&value).finish()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CallerAuthorization
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Self(None));
        };

        let value = value
            .to_str()
            .map_err(|_| ApiError::BadRequest("malformed authorization header".to_string()))?;

        Ok(Self(Some(value.to_string())))
    }
}
