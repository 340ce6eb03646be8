//! Response logging for axum routers.

use std::time::Instant;

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use courier_core::logging::{log_status, StatusEvent};
use courier_core::HttpMethod;
use uuid::Uuid;

const REQUEST_ID: &str = "x-request-id";

/// Log every response on its status channel and echo the request id.
///
/// Reuses the client's status-tiered targets, so one `EnvFilter` directive
/// tunes both sides of a call. Callers' `x-request-id` is kept when it is a
/// UUID; otherwise a fresh one is assigned.
pub async fn log_responses(request: Request, next: Next) -> Response {
    let method = request.method().as_str().parse::<HttpMethod>().ok();
    let path = request.uri().to_string();
    let request_id = request
        .headers()
        .get(REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
        .unwrap_or_else(Uuid::new_v4);
    let started = Instant::now();

    let mut response = next.run(request).await;

    match method {
        Some(method) => log_status(&StatusEvent {
            request_id,
            method,
            url: &path,
            status: response.status().as_u16(),
            elapsed: started.elapsed(),
        }),
        None => tracing::debug!(
            request_id = %request_id,
            path = path.as_str(),
            status = response.status().as_u16(),
            "served request with unlisted method"
        ),
    }

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID, value);
    }
    response
}
