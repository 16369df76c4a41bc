//! Health-check probe client.
//!
//! Issues HTTP GET probes against `<endpoint>/health_check` with the
//! configured per-probe timeout and captures the status plus any JSON body
//! for the selection policy to classify.

use std::time::Duration;

use serde_json::Value;

use crate::errors::SelectorError;
use crate::utils::health_check_url;

/// The outcome of a single successful (transport-level) health probe.
///
/// "Successful" here only means a response arrived; the selection policy
/// decides whether the response counts as healthy.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbeResponse {
    /// The endpoint the probe was issued for.
    pub endpoint: String,
    /// The health-check URL actually requested; the correlation key for
    /// classification.
    pub url: String,
    /// HTTP status code of the response.
    pub status: u16,
    /// Parsed JSON body, when present and well-formed.
    pub body: Option<Value>,
}

/// HTTP client for health-check probes, shared across rounds.
#[derive(Clone, Debug)]
pub struct HealthChecker {
    client: reqwest::Client,
    timeout: Duration,
}

impl HealthChecker {
    /// Creates a checker with the given per-probe timeout.
    pub fn new(timeout: Duration) -> Result<Self, SelectorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SelectorError::InvalidConfiguration(e.to_string()))?;
        Ok(Self { client, timeout })
    }

    /// The configured per-probe timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probes one endpoint's health check.
    ///
    /// # Returns
    /// * `Ok(ProbeResponse)` - a response arrived (any status)
    /// * `Err(SelectorError)` - timeout, connection failure, or other
    ///   transport-level error
    pub async fn probe(&self, endpoint: &str) -> Result<ProbeResponse, SelectorError> {
        let url = health_check_url(endpoint);
        let response = self.client.get(&url).send().await?;
        let status = response.status().as_u16();
        let body = response.json::<Value>().await.ok();
        Ok(ProbeResponse {
            endpoint: endpoint.to_string(),
            url,
            status,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_probe_hits_health_check_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health_check"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": "1.0.0" })))
            .expect(1)
            .mount(&server)
            .await;

        let checker = HealthChecker::new(Duration::from_secs(5)).unwrap();
        let probe = checker.probe(&server.uri()).await.unwrap();

        assert_eq!(probe.endpoint, server.uri());
        assert_eq!(probe.url, format!("{}/health_check", server.uri()));
        assert_eq!(probe.status, 200);
        assert_eq!(probe.body.unwrap()["version"], "1.0.0");
    }

    #[tokio::test]
    async fn test_probe_returns_non_200_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health_check"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let checker = HealthChecker::new(Duration::from_secs(5)).unwrap();
        let probe = checker.probe(&server.uri()).await.unwrap();
        assert_eq!(probe.status, 500);
        assert!(probe.body.is_none());
    }

    #[tokio::test]
    async fn test_probe_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health_check"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let checker = HealthChecker::new(Duration::from_millis(100)).unwrap();
        let result = checker.probe(&server.uri()).await;
        assert!(matches!(result.unwrap_err(), SelectorError::Timeout));
    }

    #[tokio::test]
    async fn test_probe_connection_refused() {
        // Port 1 is essentially guaranteed to be closed
        let checker = HealthChecker::new(Duration::from_millis(500)).unwrap();
        let result = checker.probe("http://127.0.0.1:1").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_probe_non_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health_check"))
            .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
            .mount(&server)
            .await;

        let checker = HealthChecker::new(Duration::from_secs(5)).unwrap();
        let probe = checker.probe(&server.uri()).await.unwrap();
        assert_eq!(probe.status, 200);
        assert!(probe.body.is_none());
    }
}
