//! Bounded-concurrency health-check racing.
//!
//! One round issues a probe per endpoint concurrently and drains completions
//! in I/O order. The first response the policy classifies `Healthy` wins;
//! everything else in the round is errored. Outstanding probes are aborted
//! the moment a winner is known (their futures are dropped, cancelling the
//! underlying requests), and an aborted probe counts as errored exactly like
//! a timeout. Nothing that settles after the round resolves can touch
//! selector state.

use std::collections::HashMap;

use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::Value;
use tracing::debug;

use crate::services::health::HealthChecker;
use crate::services::selection::policy::{HealthVerdict, SelectionPolicy};
use crate::utils::{health_check_url, mask_url};

/// Result of racing one round of endpoints.
#[derive(Debug, Default)]
pub(crate) struct RaceOutcome {
    /// The first endpoint whose response passed the health predicate.
    pub best: Option<String>,
    /// Every round member that did not win: probe errors, timeouts, failed
    /// predicates, and probes aborted because a winner was already found.
    pub errored: Vec<String>,
    /// Endpoints classified reachable-but-degraded, with the response body
    /// that justified recording them as fallbacks.
    pub backups: Vec<(String, Value)>,
}

/// Races health checks across `endpoints`, resolving as soon as one passes.
pub(crate) async fn race_round(
    checker: &HealthChecker,
    policy: &dyn SelectionPolicy,
    endpoints: &[String],
) -> RaceOutcome {
    let mut outcome = RaceOutcome::default();
    if endpoints.is_empty() {
        return outcome;
    }

    // Probes run against the derived health-check URL; correlate results
    // back to endpoints through it.
    let url_map: HashMap<String, String> = endpoints
        .iter()
        .map(|endpoint| (health_check_url(endpoint), endpoint.clone()))
        .collect();

    let mut in_flight: FuturesUnordered<_> = endpoints
        .iter()
        .map(|endpoint| {
            let key = health_check_url(endpoint);
            async move { (key, checker.probe(endpoint).await) }
        })
        .collect();

    let mut settled: Vec<String> = Vec::new();

    while let Some((key, result)) = in_flight.next().await {
        let Some(endpoint) = url_map.get(&key) else {
            continue;
        };
        match result {
            Ok(response) => match policy.classify(&response) {
                HealthVerdict::Healthy => {
                    outcome.best = Some(endpoint.clone());
                    break;
                }
                HealthVerdict::Behind => {
                    debug!(endpoint = %mask_url(endpoint), "endpoint behind, recording as backup");
                    outcome
                        .backups
                        .push((endpoint.clone(), response.body.unwrap_or(Value::Null)));
                    outcome.errored.push(endpoint.clone());
                    settled.push(endpoint.clone());
                }
                HealthVerdict::Unhealthy => {
                    debug!(endpoint = %mask_url(endpoint), status = response.status, "endpoint failed health predicate");
                    outcome.errored.push(endpoint.clone());
                    settled.push(endpoint.clone());
                }
            },
            Err(error) => {
                debug!(endpoint = %mask_url(endpoint), error = %error, "health probe failed");
                outcome.errored.push(endpoint.clone());
                settled.push(endpoint.clone());
            }
        }
    }

    // Dropping the stream cancels the losers; they are errored like any
    // other failed probe.
    drop(in_flight);
    if let Some(best) = &outcome.best {
        for endpoint in endpoints {
            if endpoint != best && !settled.contains(endpoint) {
                outcome.errored.push(endpoint.clone());
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::selection::policy::DefaultPolicy;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn healthy_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health_check"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        server
    }

    async fn failing_server(status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health_check"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
        server
    }

    async fn hanging_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health_check"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_race_single_healthy_endpoint_wins() {
        let server = healthy_server().await;
        let checker = HealthChecker::new(Duration::from_secs(5)).unwrap();

        let outcome = race_round(&checker, &DefaultPolicy, &[server.uri()]).await;
        assert_eq!(outcome.best, Some(server.uri()));
        assert!(outcome.errored.is_empty());
    }

    #[tokio::test]
    async fn test_race_marks_all_losers_errored() {
        let healthy = healthy_server().await;
        let hanging_a = hanging_server().await;
        let hanging_b = hanging_server().await;
        let checker = HealthChecker::new(Duration::from_secs(5)).unwrap();

        let round = vec![hanging_a.uri(), healthy.uri(), hanging_b.uri()];
        let outcome = race_round(&checker, &DefaultPolicy, &round).await;

        assert_eq!(outcome.best, Some(healthy.uri()));
        assert_eq!(outcome.errored.len(), 2);
        assert!(outcome.errored.contains(&hanging_a.uri()));
        assert!(outcome.errored.contains(&hanging_b.uri()));
    }

    #[tokio::test]
    async fn test_race_no_winner_all_errored() {
        let bad_a = failing_server(500).await;
        let bad_b = failing_server(503).await;
        let checker = HealthChecker::new(Duration::from_secs(5)).unwrap();

        let round = vec![bad_a.uri(), bad_b.uri()];
        let outcome = race_round(&checker, &DefaultPolicy, &round).await;

        assert!(outcome.best.is_none());
        assert_eq!(outcome.errored.len(), 2);
    }

    #[tokio::test]
    async fn test_race_timeout_counts_as_errored() {
        let hanging = hanging_server().await;
        let checker = HealthChecker::new(Duration::from_millis(100)).unwrap();

        let outcome = race_round(&checker, &DefaultPolicy, &[hanging.uri()]).await;
        assert!(outcome.best.is_none());
        assert_eq!(outcome.errored, vec![hanging.uri()]);
    }

    #[tokio::test]
    async fn test_race_empty_round() {
        let checker = HealthChecker::new(Duration::from_secs(1)).unwrap();
        let outcome = race_round(&checker, &DefaultPolicy, &[]).await;
        assert!(outcome.best.is_none());
        assert!(outcome.errored.is_empty());
        assert!(outcome.backups.is_empty());
    }
}
