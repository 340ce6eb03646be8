//! Status classification: which responses count as success.

use crate::error::HttpError;
use crate::http::{HttpResponse, RedirectPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    Informational,
    Success,
    Redirection,
    ClientError,
    ServerError,
    Unknown,
}

impl StatusClass {
    pub fn of(status: u16) -> Self {
        match status {
            100..=199 => StatusClass::Informational,
            200..=299 => StatusClass::Success,
            300..=399 => StatusClass::Redirection,
            400..=499 => StatusClass::ClientError,
            500..=599 => StatusClass::ServerError,
            _ => StatusClass::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusClass::Informational => "1xx",
            StatusClass::Success => "2xx",
            StatusClass::Redirection => "3xx",
            StatusClass::ClientError => "4xx",
            StatusClass::ServerError => "5xx",
            StatusClass::Unknown => "other",
        }
    }
}

/// Pass through acceptable responses and turn the rest into
/// `HttpError::Status`.
///
/// A 3xx is only acceptable when the request asked not to follow redirects;
/// otherwise it means the redirect limit was hit.
pub fn check(response: HttpResponse, redirects: RedirectPolicy) -> Result<HttpResponse, HttpError> {
    match StatusClass::of(response.status) {
        StatusClass::Success => Ok(response),
        StatusClass::Redirection if redirects == RedirectPolicy::Manual => Ok(response),
        _ => {
            let body = response.text().into_owned();
            Err(HttpError::Status {
                status: response.status,
                headers: response.headers,
                body,
            })
        }
    }
}
