//! Request descriptions and their resolution into `HttpRequest`.
//!
//! # Design
//! `RequestOptions` is what callers fill in: a url or a resource under a
//! base url, plus whatever they care about. `build` folds in the client
//! defaults and produces the wire-ready `HttpRequest`. Building never does
//! I/O, so every shaping rule is testable without a server.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::casing::{transform_keys, KeyCase};
use crate::config::ClientConfig;
use crate::error::HttpError;
use crate::http::{find_header, set_header, HttpMethod, HttpRequest, RedirectPolicy};

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Keys are converted to the request key case before encoding.
    Json(Value),
    Text(String),
    Bytes(Vec<u8>),
    Form(Vec<(String, String)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    Basic { username: String, password: String },
    Bearer(String),
}

impl Auth {
    fn header_value(&self) -> String {
        match self {
            Auth::Basic { username, password } => {
                format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
            }
            Auth::Bearer(token) => format!("Bearer {token}"),
        }
    }
}

/// Caller-facing description of a single request.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub url: String,
    pub base_url: Option<String>,
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub auth: Option<Auth>,
    pub timeout: Option<Duration>,
    pub follow_redirects: Option<bool>,
    pub max_redirects: Option<u32>,
    pub key_case: Option<KeyCase>,
    pub accept_any_status: bool,
}

impl RequestOptions {
    /// `url` may be absolute or a resource path relative to a base url.
    pub fn new(method: HttpMethod, url: &str) -> Self {
        Self {
            method,
            url: url.to_string(),
            base_url: None,
            params: Vec::new(),
            headers: Vec::new(),
            body: None,
            auth: None,
            timeout: None,
            follow_redirects: None,
            max_redirects: None,
            key_case: None,
            accept_any_status: false,
        }
    }

    pub fn get(url: &str) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn head(url: &str) -> Self {
        Self::new(HttpMethod::Head, url)
    }

    pub fn post(url: &str) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn put(url: &str) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    pub fn patch(url: &str) -> Self {
        Self::new(HttpMethod::Patch, url)
    }

    pub fn delete(url: &str) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    /// Resolve a relative url against `base_url` instead of the client's.
    pub fn resource(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.to_string());
        self
    }

    pub fn param(mut self, name: &str, value: impl ToString) -> Self {
        self.params.push((name.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, HttpError> {
        let value = serde_json::to_value(body).map_err(HttpError::Serialization)?;
        Ok(self.json_value(value))
    }

    pub fn json_value(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self
    }

    pub fn bytes(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(RequestBody::Bytes(body.into()));
        self
    }

    pub fn form(mut self, fields: &[(&str, &str)]) -> Self {
        let fields = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.body = Some(RequestBody::Form(fields));
        self
    }

    pub fn basic_auth(mut self, username: &str, password: &str) -> Self {
        self.auth = Some(Auth::Basic {
            username: username.to_string(),
            password: password.to_string(),
        });
        self
    }

    pub fn bearer_auth(mut self, token: &str) -> Self {
        self.auth = Some(Auth::Bearer(token.to_string()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = Some(follow);
        self
    }

    /// Follow at most `max` redirects; implies following.
    pub fn max_redirects(mut self, max: u32) -> Self {
        self.follow_redirects = Some(true);
        self.max_redirects = Some(max);
        self
    }

    pub fn key_case(mut self, case: KeyCase) -> Self {
        self.key_case = Some(case);
        self
    }

    /// Hand every status to the parser instead of failing on non-2xx.
    pub fn accept_any_status(mut self) -> Self {
        self.accept_any_status = true;
        self
    }

    /// Resolve into a wire-ready request.
    ///
    /// `accept` is the media type the response parser prefers; it is only
    /// sent when nothing else set an `accept` header.
    pub fn build(&self, config: &ClientConfig, accept: Option<&str>) -> Result<HttpRequest, HttpError> {
        let url = self.resolve_url(config)?;

        let mut headers = Vec::new();
        set_header(&mut headers, "user-agent", &config.user_agent);
        for (name, value) in &config.default_headers {
            set_header(&mut headers, name, value);
        }
        if let Some(accept) = accept {
            if find_header(&headers, "accept").is_none() {
                set_header(&mut headers, "accept", accept);
            }
        }

        let key_case = self.key_case.unwrap_or(config.request_key_case);
        let body = match &self.body {
            Some(body) => {
                let (content_type, bytes) = encode_body(body, key_case)?;
                set_header(&mut headers, "content-type", content_type);
                Some(bytes)
            }
            None => None,
        };

        if let Some(auth) = &self.auth {
            set_header(&mut headers, "authorization", &auth.header_value());
        }
        for (name, value) in &self.headers {
            set_header(&mut headers, name, value);
        }

        let id = Uuid::new_v4();
        if find_header(&headers, "x-request-id").is_none() {
            set_header(&mut headers, "x-request-id", &id.to_string());
        }
        validate_headers(&headers)?;

        Ok(HttpRequest {
            id,
            method: self.method,
            url,
            headers,
            body,
            timeout: self.timeout.or(config.timeout),
            redirects: self.redirect_policy(config),
        })
    }

    fn redirect_policy(&self, config: &ClientConfig) -> RedirectPolicy {
        match (self.follow_redirects, self.max_redirects) {
            (None, None) => config.redirect_policy(),
            (follow, max) => RedirectPolicy::new(
                follow.unwrap_or(config.follow_redirects),
                max.unwrap_or(config.max_redirects),
            ),
        }
    }

    fn resolve_url(&self, config: &ClientConfig) -> Result<String, HttpError> {
        let joined = if is_absolute(&self.url) {
            self.url.clone()
        } else {
            let base = self
                .base_url
                .as_deref()
                .or(config.base_url.as_deref())
                .ok_or_else(|| {
                    HttpError::InvalidRequest(format!("relative url {:?} without a base url", self.url))
                })?;
            join_url(base, &self.url)
        };

        let mut url = Url::parse(&joined)
            .map_err(|e| HttpError::InvalidRequest(format!("invalid url {joined:?}: {e}")))?;
        if !self.params.is_empty() {
            url.query_pairs_mut().extend_pairs(self.params.iter());
        }
        Ok(url.into())
    }
}

/// Reject headers either backend would refuse, so both fail the same way
/// before anything is sent.
fn validate_headers(headers: &[(String, String)]) -> Result<(), HttpError> {
    for (name, value) in headers {
        ::http::HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| HttpError::InvalidRequest(format!("invalid header name {name:?}: {e}")))?;
        ::http::HeaderValue::from_str(value)
            .map_err(|e| HttpError::InvalidRequest(format!("invalid value for header {name:?}: {e}")))?;
    }
    Ok(())
}

fn is_absolute(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn join_url(base: &str, resource: &str) -> String {
    let base = base.trim_end_matches('/');
    let resource = resource.trim_start_matches('/');
    if resource.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{resource}")
    }
}

fn encode_body(body: &RequestBody, key_case: KeyCase) -> Result<(&'static str, Vec<u8>), HttpError> {
    match body {
        RequestBody::Json(value) => {
            let value = transform_keys(value.clone(), key_case);
            let bytes = serde_json::to_vec(&value).map_err(HttpError::Serialization)?;
            Ok(("application/json", bytes))
        }
        RequestBody::Text(text) => Ok(("text/plain; charset=utf-8", text.clone().into_bytes())),
        RequestBody::Bytes(bytes) => Ok(("application/octet-stream", bytes.clone())),
        RequestBody::Form(fields) => {
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(fields.iter())
                .finish();
            Ok(("application/x-www-form-urlencoded", encoded.into_bytes()))
        }
    }
}
