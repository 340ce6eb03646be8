//! JSON in and out of handlers with key-casing applied.
//!
//! # Design
//! Handlers work with ordinary snake_case structs. `SnakeJson` normalizes
//! whatever casing the caller sent before deserializing, and `Cased`
//! renders the response in the casing the API promises (camelCase unless
//! told otherwise).

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use courier_core::casing::{transform_keys, KeyCase};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

/// Response body serialized as JSON with its keys renamed.
#[derive(Debug, Clone)]
pub struct Cased<T> {
    value: T,
    case: KeyCase,
    status: StatusCode,
}

impl<T> Cased<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            case: KeyCase::Camel,
            status: StatusCode::OK,
        }
    }

    pub fn keys(mut self, case: KeyCase) -> Self {
        self.case = case;
        self
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl<T: Serialize> IntoResponse for Cased<T> {
    fn into_response(self) -> Response {
        let encoded = serde_json::to_value(&self.value)
            .and_then(|value| serde_json::to_vec(&transform_keys(value, self.case)));
        match encoded {
            Ok(bytes) => (
                self.status,
                [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
                bytes,
            )
                .into_response(),
            Err(err) => {
                tracing::error!(error = %err, "response serialization failed");
                // rendered by hand; going through Cased again could recurse
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
                    r#"{"error":{"status":500,"message":"response serialization failed"}}"#,
                )
                    .into_response()
            }
        }
    }
}

/// JSON request body whose keys are converted to snake_case before
/// deserialization.
#[derive(Debug, Clone)]
pub struct SnakeJson<T>(pub T);

impl<S, T> FromRequest<S> for SnakeJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_json(req.headers()) {
            return Err(ApiError::new(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "expected an application/json body",
            ));
        }
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::bad_request(format!("malformed JSON: {e}")))?;
        serde_json::from_value(transform_keys(value, KeyCase::Snake))
            .map(SnakeJson)
            .map_err(|e| ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|media| {
            let media = media.trim().to_ascii_lowercase();
            media == "application/json" || media.ends_with("+json")
        })
        .unwrap_or(false)
}
