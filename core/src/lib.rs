//! Read-only client for a blob store reachable over HTTPS.
//!
//! # Overview
//! Given a reference (a URL), `HttpsStore::get` fetches the blob behind it
//! with exactly one GET. `put` and `delete` are part of the `Store` trait but
//! always fail with `StoreError::Unimplemented`.
//!
//! # Design
//! - The client depends on the `Transport` trait only. `UreqTransport` is the
//!   production implementation; `testutil::MockTransport` plays back a
//!   scripted sequence of responses for tests.
//! - Requests are plain data (`HttpRequest`); responses carry a body stream
//!   owned by the `HttpResponse`, released when the response is dropped.
//! - Three failure kinds are kept apart in `StoreError`: transport, status and
//!   unimplemented.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod store;
pub mod transport;
pub mod types;

#[cfg(test)]
pub mod testutil;

pub use client::HttpsStore;
pub use config::HttpsStoreConfig;
pub use error::{Op, StoreError, TransportError};
pub use http::{Body, HttpMethod, HttpRequest, HttpResponse};
pub use store::{Store, StoreResult};
pub use transport::{Transport, UreqTransport};
pub use types::{Location, Reference};
