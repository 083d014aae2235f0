//! The transport capability the store client runs over.
//!
//! # Design
//! `HttpsStore` never talks to the network itself. It hands an `HttpRequest`
//! to a `Transport` and interprets whatever comes back, so tests can swap in
//! a scripted transport and production code can pick any HTTP stack.
//! `UreqTransport` is the stock implementation.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::config::HttpsStoreConfig;
use crate::error::TransportError;
use crate::http::{Body, HttpMethod, HttpRequest, HttpResponse};

/// Performs one HTTP exchange.
///
/// Implementations return `Ok` for every completed exchange, whatever the
/// status code, and `Err` only when no response could be obtained.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a `ureq` agent.
///
/// ureq's status-code-as-error behaviour is disabled so 4xx/5xx responses
/// come back as data and the store client decides what they mean.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    user_agent: Option<String>,
}

impl UreqTransport {
    pub fn new(config: &HttpsStoreConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout_secs.map(Duration::from_secs))
            .build()
            .new_agent();
        Self {
            agent,
            user_agent: config.user_agent.clone(),
        }
    }

    fn headers<'a>(&'a self, request: &'a HttpRequest) -> Vec<(&'a str, &'a str)> {
        let mut headers: Vec<(&str, &str)> = request
            .headers
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        if let Some(user_agent) = &self.user_agent {
            headers.push(("user-agent", user_agent.as_str()));
        }
        headers
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(&str, &str)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        trace!(method = %request.method, url = %request.url, "sending request");
        let headers = self.headers(&request);
        let url = request.url.as_str();

        let response = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(url), &headers).call(),
            (HttpMethod::Delete, _) => with_headers(self.agent.delete(url), &headers).call(),
            (HttpMethod::Post, Some(body)) => with_headers(self.agent.post(url), &headers).send(body),
            (HttpMethod::Post, None) => with_headers(self.agent.post(url), &headers).send_empty(),
            (HttpMethod::Put, Some(body)) => with_headers(self.agent.put(url), &headers).send(body),
            (HttpMethod::Put, None) => with_headers(self.agent.put(url), &headers).send_empty(),
        }?;

        let status = response.status().as_u16();
        debug!(url = %request.url, status, "received response");

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = Body::new(response.into_body().into_reader());

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
