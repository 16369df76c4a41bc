//! Selection policy hooks.
//!
//! The three variable points of selection (short-circuit, health
//! classification, backup selection) are a strategy trait injected at
//! construction, keeping the selection algorithm itself in one concrete
//! type instead of a subclass hierarchy.

use async_trait::async_trait;
use serde_json::Value;

use crate::services::health::ProbeResponse;

/// Classification of one health-check response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HealthVerdict {
    /// Fully usable; wins the race.
    Healthy,
    /// Reachable but degraded (e.g. behind in version or block height).
    /// Recorded as a backup, selectable only when nothing clean exists.
    Behind,
    /// Not usable; recorded as unhealthy.
    Unhealthy,
}

/// Policy hooks for an [`crate::EndpointSelector`].
///
/// All methods have defaults matching the base selector behavior: no short
/// circuit, HTTP 200 means healthy, and the first recorded backup is the
/// fallback pick.
#[async_trait]
pub trait SelectionPolicy: Send + Sync {
    /// Returns an endpoint to use without any probing, when one is already
    /// known (e.g. the user's own configured node). Denylisted results are
    /// ignored by the selector.
    async fn short_circuit(&self) -> Option<String> {
        None
    }

    /// Classifies a probe response. Transport-level failures never reach
    /// this method; they are always unhealthy.
    fn classify(&self, response: &ProbeResponse) -> HealthVerdict {
        if response.status == 200 {
            HealthVerdict::Healthy
        } else {
            HealthVerdict::Unhealthy
        }
    }

    /// Picks a fallback from the recorded backups (endpoint, health body)
    /// pairs, in insertion order.
    fn select_from_backups(&self, backups: &[(String, Value)]) -> Option<String> {
        backups.first().map(|(endpoint, _)| endpoint.clone())
    }
}

/// The base policy: HTTP 200 is healthy, first backup wins.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultPolicy;

#[async_trait]
impl SelectionPolicy for DefaultPolicy {}

/// A stricter policy gating on verbose health metadata: endpoints trailing
/// the expected version or too many blocks behind are classified `Behind`
/// so they remain selectable as a last resort.
#[derive(Clone, Debug)]
pub struct VersionGatedPolicy {
    /// Minimum acceptable service version (`major.minor.patch`).
    pub min_version: String,
    /// Maximum acceptable block height lag.
    pub max_block_diff: u64,
}

impl VersionGatedPolicy {
    pub fn new(min_version: impl Into<String>, max_block_diff: u64) -> Self {
        Self {
            min_version: min_version.into(),
            max_block_diff,
        }
    }
}

#[async_trait]
impl SelectionPolicy for VersionGatedPolicy {
    fn classify(&self, response: &ProbeResponse) -> HealthVerdict {
        if response.status != 200 {
            return HealthVerdict::Unhealthy;
        }
        let Some(body) = &response.body else {
            // A strict policy needs metadata to vouch for the node
            return HealthVerdict::Unhealthy;
        };

        let version = body.get("version").and_then(Value::as_str);
        let block_diff = body.get("block_difference").and_then(Value::as_u64);

        match (version.and_then(parse_version), parse_version(&self.min_version)) {
            (Some(found), Some(required)) if found < required => return HealthVerdict::Behind,
            (None, Some(_)) => return HealthVerdict::Unhealthy,
            _ => {}
        }

        if block_diff.is_some_and(|diff| diff > self.max_block_diff) {
            return HealthVerdict::Behind;
        }

        HealthVerdict::Healthy
    }

    /// Prefers the backup with the highest version, breaking ties with the
    /// smallest block lag.
    fn select_from_backups(&self, backups: &[(String, Value)]) -> Option<String> {
        backups
            .iter()
            .max_by_key(|(_, body)| {
                let version = body
                    .get("version")
                    .and_then(Value::as_str)
                    .and_then(parse_version)
                    .unwrap_or((0, 0, 0));
                let block_diff = body
                    .get("block_difference")
                    .and_then(Value::as_u64)
                    .unwrap_or(u64::MAX);
                (version, std::cmp::Reverse(block_diff))
            })
            .map(|(endpoint, _)| endpoint.clone())
    }
}

/// Parses a dotted `major.minor.patch` version string.
fn parse_version(version: &str) -> Option<(u64, u64, u64)> {
    let mut parts = version.trim().splitn(3, '.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    let patch = parts.next().unwrap_or("0").parse().ok()?;
    Some((major, minor, patch))
}
