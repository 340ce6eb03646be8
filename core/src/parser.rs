//! Response parsers and the runtime parser selection strategy.
//!
//! # Design
//! A parser turns an accepted `HttpResponse` into whatever the caller
//! wants. Statically typed callers pick a parser type (`Json<T>`, `Text`,
//! ...); callers that only know the shape at runtime (config files, CLI
//! flags) pick a `ParserKind` and get a `Payload` back. Plain closures work
//! too.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::casing::{transform_keys, KeyCase};
use crate::error::HttpError;
use crate::http::HttpResponse;

pub trait ResponseParser: Send + 'static {
    type Output: Send + 'static;

    fn parse(&self, response: HttpResponse) -> Result<Self::Output, HttpError>;

    /// Media type to request when the caller did not set `accept`.
    fn accept(&self) -> Option<&'static str> {
        None
    }
}

impl<F, O> ResponseParser for F
where
    F: Fn(HttpResponse) -> Result<O, HttpError> + Send + 'static,
    O: Send + 'static,
{
    type Output = O;

    fn parse(&self, response: HttpResponse) -> Result<O, HttpError> {
        self(response)
    }
}

/// The response itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct Raw;

impl ResponseParser for Raw {
    type Output = HttpResponse;

    fn parse(&self, response: HttpResponse) -> Result<HttpResponse, HttpError> {
        Ok(response)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Text;

impl ResponseParser for Text {
    type Output = String;

    fn parse(&self, response: HttpResponse) -> Result<String, HttpError> {
        Ok(match String::from_utf8(response.body) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        })
    }

    fn accept(&self) -> Option<&'static str> {
        Some("text/plain, */*;q=0.5")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Bytes;

impl ResponseParser for Bytes {
    type Output = Vec<u8>;

    fn parse(&self, response: HttpResponse) -> Result<Vec<u8>, HttpError> {
        Ok(response.body)
    }
}

/// Drops the body; only the fact that the call succeeded matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl ResponseParser for Discard {
    type Output = ();

    fn parse(&self, _response: HttpResponse) -> Result<(), HttpError> {
        Ok(())
    }
}

/// Decode a JSON body into `T`, renaming keys to `case` first.
///
/// Defaults to snake_case keys so camelCase APIs land on ordinary Rust
/// structs without serde attributes.
pub struct Json<T> {
    case: KeyCase,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Json<T> {
    pub fn new() -> Self {
        Self::keys(KeyCase::Snake)
    }

    pub fn keys(case: KeyCase) -> Self {
        Self {
            case,
            _marker: PhantomData,
        }
    }
}

impl<T> Default for Json<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Json<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Json").field("case", &self.case).finish()
    }
}

impl<T> ResponseParser for Json<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = T;

    fn parse(&self, response: HttpResponse) -> Result<T, HttpError> {
        let value = decode_json(&response)?;
        serde_json::from_value(transform_keys(value, self.case)).map_err(|source| {
            HttpError::Deserialization {
                status: response.status,
                body: response.text().into_owned(),
                source,
            }
        })
    }

    fn accept(&self) -> Option<&'static str> {
        Some("application/json")
    }
}

fn decode_json(response: &HttpResponse) -> Result<Value, HttpError> {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&response.body).map_err(|source| HttpError::Deserialization {
        status: response.status,
        body: response.text().into_owned(),
        source,
    })
}

/// Body decoded by a runtime-selected `ParserKind`.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
    Bytes(Vec<u8>),
    Empty,
}

impl Payload {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Parser selection strategy for callers that choose at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserKind {
    /// Choose by the response content type.
    #[default]
    Auto,
    Json(KeyCase),
    Text,
    Bytes,
    None,
}

impl FromStr for ParserKind {
    type Err = HttpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ParserKind::Auto),
            "json" => Ok(ParserKind::Json(KeyCase::Preserve)),
            "json-camel" => Ok(ParserKind::Json(KeyCase::Camel)),
            "json-snake" => Ok(ParserKind::Json(KeyCase::Snake)),
            "json-kebab" => Ok(ParserKind::Json(KeyCase::Kebab)),
            "text" => Ok(ParserKind::Text),
            "bytes" => Ok(ParserKind::Bytes),
            "none" => Ok(ParserKind::None),
            other => Err(HttpError::Config(format!("unknown response parser: {other}"))),
        }
    }
}

impl ParserKind {
    /// The concrete parser `Auto` resolves to for this response.
    pub fn select(&self, response: &HttpResponse) -> ParserKind {
        if *self != ParserKind::Auto {
            return *self;
        }
        if response.body.is_empty() {
            return ParserKind::None;
        }
        match response.content_type() {
            Some(media) if is_json(&media) => ParserKind::Json(KeyCase::Snake),
            Some(media) if is_text(&media) => ParserKind::Text,
            _ => ParserKind::Bytes,
        }
    }
}

impl ResponseParser for ParserKind {
    type Output = Payload;

    fn parse(&self, response: HttpResponse) -> Result<Payload, HttpError> {
        match self.select(&response) {
            ParserKind::Json(case) => Ok(Payload::Json(transform_keys(decode_json(&response)?, case))),
            ParserKind::Text => Text.parse(response).map(Payload::Text),
            ParserKind::Bytes => Ok(Payload::Bytes(response.body)),
            ParserKind::None | ParserKind::Auto => Ok(Payload::Empty),
        }
    }

    fn accept(&self) -> Option<&'static str> {
        match self {
            ParserKind::Json(_) => Some("application/json"),
            ParserKind::Text => Text.accept(),
            _ => None,
        }
    }
}

fn is_json(media: &str) -> bool {
    media == "application/json" || media.ends_with("+json")
}

fn is_text(media: &str) -> bool {
    media.starts_with("text/")
        || media == "application/xml"
        || media.ends_with("+xml")
        || media == "application/x-www-form-urlencoded"
}
