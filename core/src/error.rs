//! Error types for the blob store client.
//!
//! # Design
//! Three kinds of failure reach the caller and each one gets its own variant:
//! the transport could not complete the exchange, the store answered with a
//! non-2xx status, or the operation is not supported by this backend at all.
//! The `Display` text is part of the public contract; callers and tests match
//! on strings such as `Get: <reference>: <cause>` and `Put: not implemented`.

use std::error::Error as StdError;
use std::fmt;

use crate::types::Reference;

/// The store operation an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Get,
    Put,
    Delete,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Op::Get => "Get",
            Op::Put => "Put",
            Op::Delete => "Delete",
        })
    }
}

/// A failure reported by a transport: the exchange did not complete.
///
/// Displays exactly as the underlying error does.
#[derive(Debug)]
pub struct TransportError(Box<dyn StdError + Send + Sync>);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl StdError for TransportError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl TransportError {
    /// Wraps an error value, or a plain message.
    pub fn new(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        TransportError(err.into())
    }

    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync> {
        self.0
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::new(err)
    }
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        TransportError::new(err)
    }
}

/// Errors returned by `Store` operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The transport failed before a response was available, or while the
    /// response body was being read.
    #[error("{op}: {reference}: {source}")]
    Transport {
        op: Op,
        reference: Reference,
        #[source]
        source: TransportError,
    },

    /// The store answered with a status outside 2xx.
    #[error("{op}: {reference}: {status} {reason}{}", explanation_suffix(.explanation))]
    Status {
        op: Op,
        reference: Reference,
        status: u16,
        reason: String,
        explanation: String,
    },

    /// This backend does not support the operation.
    #[error("{op}: not implemented")]
    Unimplemented { op: Op },
}

fn explanation_suffix(explanation: &str) -> String {
    if explanation.is_empty() {
        String::new()
    } else {
        format!(": {explanation}")
    }
}

impl StoreError {
    pub fn op(&self) -> Op {
        match self {
            StoreError::Transport { op, .. }
            | StoreError::Status { op, .. }
            | StoreError::Unimplemented { op } => *op,
        }
    }

    /// The HTTP status, for status failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unimplemented(&self) -> bool {
        matches!(self, StoreError::Unimplemented { .. })
    }
}
