//! The wrapped HTTP client libraries.
//!
//! # Design
//! A `Transport` moves one resolved `HttpRequest` over the wire and returns
//! the raw `HttpResponse`, whatever its status. Status interpretation,
//! logging and parsing happen in the client pipeline, so both backends
//! behave identically above this line.

mod reqwest_transport;
mod ureq_transport;

use std::future::Future;

pub use reqwest_transport::ReqwestTransport;
pub use ureq_transport::UreqTransport;

use crate::error::HttpError;
use crate::http::{HttpRequest, HttpResponse};

pub trait Transport: Send + Sync + 'static {
    /// Send the request. Non-2xx statuses are returned as data, never as
    /// errors.
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, HttpError>> + Send;
}

fn header_pairs<'a, I>(headers: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (&'a ::http::HeaderName, &'a ::http::HeaderValue)>,
{
    headers
        .into_iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect()
}
