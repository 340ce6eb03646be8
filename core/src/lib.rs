//! Convenience layer over the `ureq` and `reqwest` HTTP clients.
//!
//! # Overview
//! Callers describe a request with `RequestOptions`, pick a response parser,
//! and get back a `Pending` completion slot that resolves to exactly one
//! outcome: the parsed value or a normalized `HttpError`. Along the way
//! every response is logged on a per-status `tracing` target.
//!
//! # Design
//! - The HTTP work itself (sockets, TLS, pooling, redirects) belongs to the
//!   wrapped libraries behind the `Transport` trait.
//! - Shaping (`request`), parsing (`parser`), classification (`classify`)
//!   and key casing (`casing`) are pure functions over owned data, testable
//!   without a network.
//! - The same pipeline runs on both backends, async via a spawned task or
//!   inline through `Client::send_blocking`.

pub mod casing;
pub mod classify;
pub mod client;
pub mod completion;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod parser;
pub mod request;
pub mod transport;

pub use casing::{convert_key, transform_keys, KeyCase};
pub use classify::StatusClass;
pub use client::Client;
pub use completion::{completion, Completer, Pending};
pub use config::ClientConfig;
pub use error::HttpError;
pub use crate::http::{HttpMethod, HttpRequest, HttpResponse, RedirectPolicy};
pub use parser::{Json, ParserKind, Payload, ResponseParser};
pub use request::{Auth, RequestBody, RequestOptions};
pub use transport::{ReqwestTransport, Transport, UreqTransport};
