//! Status-tiered logging.
//!
//! Every status code in 100..=599 logs under its own `tracing` target,
//! `courier::status::<class>::<code>`; codes outside that range log under
//! `courier::status::other`. Because `EnvFilter` matches target prefixes,
//! `courier::status::4xx=off` silences a whole class while
//! `courier::status::4xx::404=debug` tunes a single code.
//!
//! Targets and levels have to be known at compile time, so the build script
//! writes a table that expands into one event callsite per code.

use std::time::Duration;

use uuid::Uuid;

use crate::error::HttpError;
use crate::http::HttpMethod;

/// One completed exchange, as seen by the logger.
#[derive(Debug, Clone, Copy)]
pub struct StatusEvent<'a> {
    pub request_id: Uuid,
    pub method: HttpMethod,
    pub url: &'a str,
    pub status: u16,
    pub elapsed: Duration,
}

macro_rules! status_table {
    ($($code:literal => $class:literal, $level:ident;)*) => {
        /// Log `event` on the channel of its status code.
        pub fn log_status(event: &StatusEvent<'_>) {
            let elapsed_ms = event.elapsed.as_millis() as u64;
            match event.status {
                $(
                    $code => tracing::event!(
                        target: concat!("courier::status::", $class, "::", $code),
                        tracing::Level::$level,
                        request_id = %event.request_id,
                        method = %event.method,
                        url = event.url,
                        status = event.status,
                        elapsed_ms,
                        "{} {} -> {}", event.method, event.url, event.status
                    ),
                )*
                _ => tracing::warn!(
                    target: "courier::status::other",
                    request_id = %event.request_id,
                    method = %event.method,
                    url = event.url,
                    status = event.status,
                    elapsed_ms,
                    "{} {} -> {}", event.method, event.url, event.status
                ),
            }
        }

        /// The `tracing` target a response with `status` is logged under.
        pub fn status_target(status: u16) -> &'static str {
            match status {
                $($code => concat!("courier::status::", $class, "::", $code),)*
                _ => "courier::status::other",
            }
        }
    };
}

// Rows for 100..=599, generated by build.rs.
include!(concat!(env!("OUT_DIR"), "/status_table.rs"));

/// Log a call that never produced a response.
pub fn log_failure(request_id: Uuid, method: HttpMethod, url: &str, error: &HttpError, elapsed: Duration) {
    let elapsed_ms = elapsed.as_millis() as u64;
    if error.is_timeout() {
        tracing::warn!(
            target: "courier::transport",
            request_id = %request_id,
            method = %method,
            url,
            elapsed_ms,
            "{method} {url} timed out"
        );
    } else {
        tracing::error!(
            target: "courier::transport",
            request_id = %request_id,
            method = %method,
            url,
            elapsed_ms,
            error = %error,
            "{method} {url} failed"
        );
    }
}
