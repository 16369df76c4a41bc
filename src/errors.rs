//! Error types for the endpoint selector.
//!
//! Individual probe failures are categorized here but never escape
//! `select`/`find_all`; they are folded into selector state. Only
//! configuration problems surface to the caller, at construction time.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Serialize)]
pub enum SelectorError {
    #[error("Invalid selector configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Request timeout")]
    Timeout,
    #[error("Transport error: {0}")]
    TransportError(String),
    #[error("Service provider error: {0}")]
    ProviderError(String),
}

/// Categorizes a reqwest error into an appropriate `SelectorError` variant.
///
/// Non-200 responses are not errors at this level: probes return the status
/// for the selection policy to classify. Only transport-level failures land
/// here.
///
/// - Timeout errors become `SelectorError::Timeout`
/// - Everything else (connection failures, protocol errors) becomes
///   `SelectorError::TransportError`
fn categorize_reqwest_error(err: &reqwest::Error) -> SelectorError {
    if err.is_timeout() {
        return SelectorError::Timeout;
    }

    SelectorError::TransportError(err.to_string())
}

impl From<reqwest::Error> for SelectorError {
    fn from(err: reqwest::Error) -> Self {
        categorize_reqwest_error(&err)
    }
}

impl From<String> for SelectorError {
    fn from(error: String) -> Self {
        SelectorError::ProviderError(error)
    }
}
