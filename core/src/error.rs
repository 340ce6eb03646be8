//! Normalized error type for every client call.
//!
//! # Design
//! Whatever went wrong, the completion slot receives one `HttpError`. An
//! unexpected status keeps the raw status, headers and body so callers can
//! inspect error payloads. Library failures keep the library error as the
//! `source()` cause instead of flattening it to a string.

use crate::classify::StatusClass;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The server answered with a status the request did not accept.
    #[error("HTTP {status}: {body}")]
    Status {
        status: u16,
        headers: Vec<(String, String)>,
        body: String,
    },

    /// The underlying client gave up waiting.
    #[error("request timed out")]
    Timeout,

    /// Connection, TLS or protocol failure reported by the underlying client.
    #[error("transport failed: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The request description could not be turned into a request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The response body could not be decoded by the selected parser.
    #[error("deserialization of HTTP {status} body failed: {source}")]
    Deserialization {
        status: u16,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    /// The completion slot was dropped without a value.
    #[error("request was canceled before completing")]
    Canceled,

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl HttpError {
    pub(crate) fn transport(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        HttpError::Transport {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } | HttpError::Deserialization { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            HttpError::Status { body, .. } | HttpError::Deserialization { body, .. } => {
                Some(body.as_str())
            }
            _ => None,
        }
    }

    pub fn class(&self) -> Option<StatusClass> {
        self.status().map(StatusClass::of)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, HttpError::Status { status: 404, .. })
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, HttpError::Status { status, .. } if StatusClass::of(*status) == StatusClass::ClientError)
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self, HttpError::Status { status, .. } if StatusClass::of(*status) == StatusClass::ServerError)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpError::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    fn status_error(status: u16) -> HttpError {
        HttpError::Status {
            status,
            headers: Vec::new(),
            body: "nope".to_string(),
        }
    }

    #[test]
    fn status_error_exposes_status_and_body() {
        let err = status_error(404);
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.body(), Some("nope"));
        assert!(err.is_not_found());
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
        assert_eq!(err.to_string(), "HTTP 404: nope");
    }

    #[test]
    fn server_errors_are_classified() {
        let err = status_error(503);
        assert!(err.is_server_error());
        assert_eq!(err.class(), Some(StatusClass::ServerError));
    }

    #[test]
    fn transport_error_keeps_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = HttpError::transport("connect", io);
        assert_eq!(err.status(), None);
        assert_eq!(err.source().unwrap().to_string(), "refused");
    }

    #[test]
    fn deserialization_error_keeps_body() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = HttpError::Deserialization {
            status: 200,
            body: "{".to_string(),
            source,
        };
        assert_eq!(err.status(), Some(200));
        assert_eq!(err.body(), Some("{"));
        assert!(err.source().is_some());
        assert!(!err.is_client_error());
    }
}
