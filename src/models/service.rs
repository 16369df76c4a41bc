//! Service endpoint models.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A backend service endpoint, optionally carrying the verbose metadata
/// (version, block height, etc.) reported by its health check.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Service {
    /// Base URL identifying the service instance.
    pub endpoint: String,
    /// Verbose health-check metadata, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Service {
    /// Creates a service from a bare endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            data: None,
        }
    }

    /// Creates a service carrying verbose metadata.
    pub fn with_data(endpoint: impl Into<String>, data: Value) -> Self {
        Self {
            endpoint: endpoint.into(),
            data: Some(data),
        }
    }
}

impl From<String> for Service {
    fn from(endpoint: String) -> Self {
        Self::new(endpoint)
    }
}

impl From<&str> for Service {
    fn from(endpoint: &str) -> Self {
        Self::new(endpoint)
    }
}
