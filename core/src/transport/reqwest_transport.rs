use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use reqwest::redirect::Policy;
use reqwest::{Client, Method};

use crate::error::HttpError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RedirectPolicy};

use super::{header_pairs, Transport};

/// Backend on top of `reqwest`'s async, pooled client.
///
/// Redirect handling is a client-level setting in reqwest, so one pooled
/// client is kept per redirect limit seen so far. Hitting the limit hands
/// back the last 3xx as data, same as the ureq backend.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    manual: Client,
    following: Arc<Mutex<HashMap<u32, Client>>>,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, HttpError> {
        Ok(Self {
            manual: build_client(Policy::none())?,
            following: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    fn client_for(&self, redirects: RedirectPolicy) -> Result<Client, HttpError> {
        let max = match redirects {
            RedirectPolicy::Manual => return Ok(self.manual.clone()),
            RedirectPolicy::Follow(max) => max,
        };
        let mut clients = self.following.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = clients.get(&max) {
            return Ok(client.clone());
        }
        let client = build_client(Policy::custom(move |attempt| {
            if attempt.previous().len() > max as usize {
                attempt.stop()
            } else {
                attempt.follow()
            }
        }))?;
        clients.insert(max, client.clone());
        Ok(client)
    }
}

impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let client = self.client_for(request.redirects)?;

        let mut builder = client.request(method(request.method), request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_error)?;
        let status = response.status().as_u16();
        let headers = header_pairs(response.headers());
        let body = response.bytes().await.map_err(map_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

fn build_client(policy: Policy) -> Result<Client, HttpError> {
    Client::builder()
        .redirect(policy)
        .build()
        .map_err(|e| HttpError::transport("could not build reqwest client", e))
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Options => Method::OPTIONS,
    }
}

fn map_error(err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout
    } else {
        HttpError::transport("reqwest request failed", err)
    }
}
