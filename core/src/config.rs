use serde::{Deserialize, Serialize};

/// Configuration for an HTTPS-backed store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpsStoreConfig {
    /// Base endpoint of the store, e.g. `https://blobs.example.com`.
    pub endpoint: String,
    /// Overall per-request timeout enforced by the transport.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl HttpsStoreConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout_secs: None,
            user_agent: None,
        }
    }
}
