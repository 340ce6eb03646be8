//! The dispatch pipeline.
//!
//! # Design
//! `Client` owns nothing but a transport and the defaults. A call is a
//! straight line: resolve the `RequestOptions`, hand the `HttpRequest` to
//! the transport, log the status on its channel, classify, parse, and put
//! the one outcome into the completion slot. The async path runs that line
//! on a spawned tokio task; `send_blocking` runs it inline on the ureq
//! backend.

use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::classify;
use crate::completion::{completion, Completer, Pending};
use crate::config::ClientConfig;
use crate::error::HttpError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RedirectPolicy};
use crate::logging::{self, StatusEvent};
use crate::parser::{Json, ResponseParser};
use crate::request::RequestOptions;
use crate::transport::{ReqwestTransport, Transport, UreqTransport};

#[derive(Debug)]
pub struct Client<T> {
    transport: Arc<T>,
    config: Arc<ClientConfig>,
}

impl<T> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: Arc::clone(&self.config),
        }
    }
}

impl Client<ReqwestTransport> {
    /// Async client on the reqwest backend.
    pub fn reqwest(config: ClientConfig) -> Result<Self, HttpError> {
        Ok(Self::new(ReqwestTransport::new()?, config))
    }
}

impl Client<UreqTransport> {
    /// Client on the ureq backend; usable with or without a runtime.
    pub fn ureq(config: ClientConfig) -> Self {
        Self::new(UreqTransport::new(), config)
    }

    /// Run the whole pipeline on the current thread.
    pub fn send_blocking<P: ResponseParser>(
        &self,
        options: RequestOptions,
        parser: P,
    ) -> Result<P::Output, HttpError> {
        let request = options.build(&self.config, parser.accept())?;
        let exchange = Exchange::start(&request, options.accept_any_status);
        let result = self.transport.execute_blocking(&request);
        exchange.finish(result, &parser)
    }
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Start a request and return its completion slot.
    pub fn request<P: ResponseParser>(&self, options: RequestOptions, parser: P) -> Pending<P::Output> {
        let (completer, pending) = completion();
        self.dispatch(options, parser, completer);
        pending
    }

    /// Start a request that reports into a caller-supplied completer.
    ///
    /// Must be called within a tokio runtime; otherwise the completer
    /// receives a transport error straight away.
    pub fn dispatch<P: ResponseParser>(
        &self,
        options: RequestOptions,
        parser: P,
        completer: Completer<P::Output>,
    ) {
        let request = match options.build(&self.config, parser.accept()) {
            Ok(request) => request,
            Err(err) => {
                completer.complete(Err(err));
                return;
            }
        };
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(err) => {
                completer.complete(Err(HttpError::transport("no tokio runtime to dispatch on", err)));
                return;
            }
        };

        tracing::debug!(
            target: "courier::dispatch",
            request_id = %request.id,
            method = %request.method,
            url = request.url.as_str(),
            "dispatching"
        );

        let transport = Arc::clone(&self.transport);
        let accept_any_status = options.accept_any_status;
        handle.spawn(async move {
            if completer.is_abandoned() {
                return;
            }
            let exchange = Exchange::start(&request, accept_any_status);
            let result = transport.execute(request).await;
            completer.complete(exchange.finish(result, &parser));
        });
    }

    pub async fn send<P: ResponseParser>(
        &self,
        options: RequestOptions,
        parser: P,
    ) -> Result<P::Output, HttpError> {
        self.request(options, parser).await
    }

    /// GET `url` and decode the JSON body with snake_case keys.
    pub fn get_json<R>(&self, url: &str) -> Pending<R>
    where
        R: DeserializeOwned + Send + 'static,
    {
        self.request(RequestOptions::get(url), Json::<R>::new())
    }

    /// POST `body` as JSON to `url` and decode the JSON reply.
    pub fn post_json<B, R>(&self, url: &str, body: &B) -> Pending<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned + Send + 'static,
    {
        match RequestOptions::post(url).json(body) {
            Ok(options) => self.request(options, Json::<R>::new()),
            Err(err) => {
                let (completer, pending) = completion();
                completer.complete(Err(err));
                pending
            }
        }
    }
}

/// Bookkeeping for one in-flight call, shared by the async and blocking
/// paths.
struct Exchange {
    request_id: Uuid,
    method: HttpMethod,
    url: String,
    redirects: RedirectPolicy,
    accept_any_status: bool,
    started: Instant,
}

impl Exchange {
    fn start(request: &HttpRequest, accept_any_status: bool) -> Self {
        Self {
            request_id: request.id,
            method: request.method,
            url: request.url.clone(),
            redirects: request.redirects,
            accept_any_status,
            started: Instant::now(),
        }
    }

    fn finish<P: ResponseParser>(
        self,
        result: Result<HttpResponse, HttpError>,
        parser: &P,
    ) -> Result<P::Output, HttpError> {
        let elapsed = self.started.elapsed();
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                logging::log_failure(self.request_id, self.method, &self.url, &err, elapsed);
                return Err(err);
            }
        };

        logging::log_status(&StatusEvent {
            request_id: self.request_id,
            method: self.method,
            url: &self.url,
            status: response.status,
            elapsed,
        });

        let response = if self.accept_any_status {
            response
        } else {
            classify::check(response, self.redirects)?
        };
        parser.parse(response)
    }
}
