//! Request body extraction
//!
//! Bodies are parsed as JSON whatever the `Content-Type` says. Fields are read
//! by name only: an empty body, or JSON that is not an object, becomes
//! `T::default()` so it fails validation instead of parsing.

use axum::async_trait;
use axum::extract::{FromRequest, Request};
use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            log::warn!("Failed to read request body: {}", e);
            ApiError::MalformedJson
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonBody(T::default()));
        }

        let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
            log::debug!("Rejected malformed JSON body: {}", e);
            ApiError::MalformedJson
        })?;

        if !value.is_object() {
            log::debug!("Ignoring non-object JSON body");
            return Ok(JsonBody(T::default()));
        }

        serde_json::from_value(value).map(JsonBody).map_err(|e| {
            log::debug!("Rejected JSON body: {}", e);
            ApiError::MalformedJson
        })
    }
}
