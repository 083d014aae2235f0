//! Read-only store client over HTTPS.
//!
//! # Design
//! `HttpsStore` holds a base endpoint and a transport and nothing else; it
//! keeps no mutable state between calls. `get` is split the same way every
//! request in this crate is: `build_get` produces the `HttpRequest`, the
//! transport executes it, and `parse_get` consumes the `HttpResponse`. The
//! response is moved into `parse_get`, so its body is dropped, and the
//! connection behind it released, on every return path.
//!
//! Writes are not supported. `put` and `delete` fail with
//! `StoreError::Unimplemented` without touching the transport.

use std::io::Read;

use tracing::{debug, instrument, warn};

use crate::config::HttpsStoreConfig;
use crate::error::{Op, StoreError, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::store::{Store, StoreResult};
use crate::transport::{Transport, UreqTransport};
use crate::types::{locations_from_links, Location, Reference};

/// Longest slice of a non-2xx body quoted in a status error.
const MAX_EXPLANATION_LEN: usize = 512;

/// Blob store client that fetches references over HTTP(S).
#[derive(Debug)]
pub struct HttpsStore<T> {
    endpoint: String,
    transport: T,
}

impl HttpsStore<UreqTransport> {
    pub fn from_config(config: &HttpsStoreConfig) -> Self {
        Self::new(config.endpoint.clone(), UreqTransport::new(config))
    }
}

impl<T: Transport> HttpsStore<T> {
    /// The endpoint is stored as given; a malformed one only shows up later
    /// as transport errors.
    pub fn new(endpoint: impl Into<String>, transport: T) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The reference is the request target; the endpoint is not prepended.
    pub fn build_get(&self, reference: &Reference) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: reference.as_str().to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_get(
        &self,
        reference: &Reference,
        mut response: HttpResponse,
    ) -> StoreResult<(Vec<u8>, Vec<Location>)> {
        debug!(status = response.status, "store replied");

        if !response.is_success() {
            let mut body = Vec::new();
            if let Err(e) = response.body.read_to_end(&mut body) {
                warn!("reading error body for {reference}: {e}");
            }
            return Err(StoreError::Status {
                op: Op::Get,
                reference: reference.clone(),
                status: response.status,
                reason: response.reason().to_string(),
                explanation: explanation(&body),
            });
        }

        let mut data = Vec::new();
        response
            .body
            .read_to_end(&mut data)
            .map_err(|e| StoreError::Transport {
                op: Op::Get,
                reference: reference.clone(),
                source: TransportError::from(e),
            })?;
        debug!(len = data.len(), "read blob");

        let locations = locations_from_links(response.header_values("link"));
        Ok((data, locations))
    }
}

/// Quotes at most `MAX_EXPLANATION_LEN` bytes of the body, cut on a char
/// boundary.
fn explanation(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let end = text
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|&end| end <= MAX_EXPLANATION_LEN)
        .last()
        .unwrap_or(0);
    text[..end].trim_end().to_string()
}

impl<T: Transport + std::fmt::Debug> Store for HttpsStore<T> {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[instrument(skip(self), fields(endpoint = %self.endpoint), err)]
    fn get(&self, reference: &Reference) -> StoreResult<(Vec<u8>, Vec<Location>)> {
        let request = self.build_get(reference);
        let response = self
            .transport
            .execute(request)
            .map_err(|source| StoreError::Transport {
                op: Op::Get,
                reference: reference.clone(),
                source,
            })?;
        self.parse_get(reference, response)
    }

    fn put(&self, data: &[u8]) -> StoreResult<Reference> {
        debug!(len = data.len(), "put rejected: store is read-only");
        Err(StoreError::Unimplemented { op: Op::Put })
    }

    fn delete(&self, reference: &Reference) -> StoreResult<()> {
        debug!(%reference, "delete rejected: store is read-only");
        Err(StoreError::Unimplemented { op: Op::Delete })
    }
}
