//! Normalized error responses.
//!
//! Every failure a handler returns renders the same way:
//! `{"error": {"status": 404, "message": "..."}}` with the matching status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use courier_core::casing::KeyCase;
use courier_core::HttpError;
use serde_json::json;

use crate::json::Cased;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{status}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "status": self.status.as_u16(),
                "message": self.message,
            }
        });
        Cased::new(body).keys(KeyCase::Preserve).status(self.status).into_response()
    }
}

/// Upstream failures seen by a handler that proxies through the client.
///
/// Error statuses pass through; anything that never got a usable answer
/// is a gateway problem.
impl From<HttpError> for ApiError {
    fn from(err: HttpError) -> Self {
        let status = match &err {
            HttpError::Status { status, .. } if *status >= 400 => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            HttpError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            HttpError::Status { .. }
            | HttpError::Transport { .. }
            | HttpError::Deserialization { .. }
            | HttpError::Canceled => StatusCode::BAD_GATEWAY,
            HttpError::InvalidRequest(_) | HttpError::Serialization(_) | HttpError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_client_errors_pass_through() {
        let err = ApiError::from(HttpError::Status {
            status: 409,
            headers: Vec::new(),
            body: "conflict".to_string(),
        });
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.message, "HTTP 409: conflict");
    }

    #[test]
    fn upstream_redirects_are_bad_gateway() {
        let err = ApiError::from(HttpError::Status {
            status: 302,
            headers: Vec::new(),
            body: String::new(),
        });
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn timeouts_map_to_gateway_timeout() {
        assert_eq!(ApiError::from(HttpError::Timeout).status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(ApiError::from(HttpError::Canceled).status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn local_mistakes_are_internal_errors() {
        let err = ApiError::from(HttpError::InvalidRequest("bad url".to_string()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
