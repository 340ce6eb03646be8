use std::io;

use crate::error::HttpError;
use crate::http::{HttpRequest, HttpResponse, RedirectPolicy};

use super::{header_pairs, Transport};

const DEFAULT_BODY_LIMIT: u64 = 10 * 1024 * 1024;

/// Backend on top of `ureq`'s blocking agent.
///
/// Each request gets an agent configured with its own timeout and redirect
/// policy, with `http_status_as_error` off so 4xx/5xx come back as data.
/// The async path runs on tokio's blocking pool; `execute_blocking` serves
/// callers without a runtime.
#[derive(Debug, Clone, Copy)]
pub struct UreqTransport {
    body_limit: u64,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        Self {
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Largest response body read before failing the call.
    pub fn with_body_limit(body_limit: u64) -> Self {
        Self { body_limit }
    }

    pub fn execute_blocking(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let agent = agent_for(request);

        let mut builder = ::http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let sent = match &request.body {
            Some(body) => builder
                .body(body.as_slice())
                .map_err(|e| HttpError::InvalidRequest(e.to_string()))
                .and_then(|req| agent.run(req).map_err(map_error)),
            None => builder
                .body(())
                .map_err(|e| HttpError::InvalidRequest(e.to_string()))
                .and_then(|req| agent.run(req).map_err(map_error)),
        };
        let mut response = sent?;

        let status = response.status().as_u16();
        let headers = header_pairs(response.headers());
        let body = response
            .body_mut()
            .with_config()
            .limit(self.body_limit)
            .read_to_vec()
            .map_err(map_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let transport = *self;
        tokio::task::spawn_blocking(move || transport.execute_blocking(&request))
            .await
            .map_err(|e| HttpError::transport("blocking worker failed", e))?
    }
}

fn agent_for(request: &HttpRequest) -> ureq::Agent {
    let max_redirects = match request.redirects {
        RedirectPolicy::Follow(max) => max,
        RedirectPolicy::Manual => 0,
    };
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(request.timeout)
        .max_redirects(max_redirects)
        // hand back the last 3xx instead of erroring; classification
        // decides what it means
        .max_redirects_will_error(false)
        .build()
        .new_agent()
}

fn map_error(err: ureq::Error) -> HttpError {
    match err {
        ureq::Error::Timeout(_) => HttpError::Timeout,
        ureq::Error::Io(io) if io.kind() == io::ErrorKind::TimedOut => HttpError::Timeout,
        other => HttpError::transport("ureq request failed", other),
    }
}
