//! Configuration for the endpoint selector.
//!
//! A `SelectorConfig` is immutable after construction: it carries the
//! optional allowlist/denylist, the round-size bound, the per-probe timeout
//! and the TTLs governing how long unhealthy/backup observations are kept.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::SelectorError;
use crate::utils::{hours_ms, minutes_ms, seconds_ms};

/// Default number of endpoints probed concurrently in one selection round.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 6;
/// Default per-probe timeout in milliseconds (30 seconds).
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = seconds_ms(30);
/// Default time-to-live for the unhealthy set in milliseconds (1 hour).
pub const DEFAULT_UNHEALTHY_TTL_MS: u64 = hours_ms(1);
/// Default time-to-live for the backups map in milliseconds (2 minutes).
pub const DEFAULT_BACKUPS_TTL_MS: u64 = minutes_ms(2);

/// Immutable configuration for an [`crate::EndpointSelector`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SelectorConfig {
    /// Restricts selection to only these endpoint URLs, when set.
    #[serde(default)]
    pub whitelist: Option<HashSet<String>>,
    /// Endpoint URLs that must never be selected.
    #[serde(default)]
    pub blacklist: Option<HashSet<String>>,
    /// Maximum number of endpoints probed concurrently in one round.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
    /// Per-probe timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Time after which the unhealthy set is cleared, in milliseconds.
    #[serde(default = "default_unhealthy_ttl_ms")]
    pub unhealthy_ttl_ms: u64,
    /// Time after which the backups map is cleared, in milliseconds.
    #[serde(default = "default_backups_ttl_ms")]
    pub backups_ttl_ms: u64,
}

fn default_max_concurrent_requests() -> usize {
    DEFAULT_MAX_CONCURRENT_REQUESTS
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_unhealthy_ttl_ms() -> u64 {
    DEFAULT_UNHEALTHY_TTL_MS
}

fn default_backups_ttl_ms() -> u64 {
    DEFAULT_BACKUPS_TTL_MS
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            whitelist: None,
            blacklist: None,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            unhealthy_ttl_ms: DEFAULT_UNHEALTHY_TTL_MS,
            backups_ttl_ms: DEFAULT_BACKUPS_TTL_MS,
        }
    }
}

impl SelectorConfig {
    /// Creates a configuration with the documented defaults and no list
    /// filtering.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the configuration.
    ///
    /// # Returns
    /// * `Err(SelectorError::InvalidConfiguration)` when a field would make
    ///   selection impossible (zero round size, zero timeout or TTLs).
    pub fn validate(&self) -> Result<(), SelectorError> {
        if self.max_concurrent_requests == 0 {
            return Err(SelectorError::InvalidConfiguration(
                "max_concurrent_requests must be greater than zero".to_string(),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(SelectorError::InvalidConfiguration(
                "request_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.unhealthy_ttl_ms == 0 || self.backups_ttl_ms == 0 {
            return Err(SelectorError::InvalidConfiguration(
                "TTL values must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-probe timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Unhealthy-set TTL as a `Duration`.
    pub fn unhealthy_ttl(&self) -> Duration {
        Duration::from_millis(self.unhealthy_ttl_ms)
    }

    /// Backups-map TTL as a `Duration`.
    pub fn backups_ttl(&self) -> Duration {
        Duration::from_millis(self.backups_ttl_ms)
    }

    /// True when the endpoint is denylisted.
    pub fn is_blacklisted(&self, endpoint: &str) -> bool {
        self.blacklist
            .as_ref()
            .is_some_and(|list| list.contains(endpoint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = SelectorConfig::default();
        assert_eq!(config.max_concurrent_requests, 6);
        assert_eq!(config.request_timeout_ms, 30_000);
        assert_eq!(config.unhealthy_ttl_ms, 3_600_000);
        assert_eq!(config.backups_ttl_ms, 120_000);
        assert!(config.whitelist.is_none());
        assert!(config.blacklist.is_none());
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(SelectorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_round_size() {
        let config = SelectorConfig {
            max_concurrent_requests: 0,
            ..Default::default()
        };
        let result = config.validate();
        assert!(matches!(
            result.unwrap_err(),
            SelectorError::InvalidConfiguration(_)
        ));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = SelectorConfig {
            request_timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_ttls() {
        let config = SelectorConfig {
            unhealthy_ttl_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SelectorConfig {
            backups_ttl_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_is_blacklisted() {
        let config = SelectorConfig {
            blacklist: Some(HashSet::from(["http://bad".to_string()])),
            ..Default::default()
        };
        assert!(config.is_blacklisted("http://bad"));
        assert!(!config.is_blacklisted("http://good"));

        let config = SelectorConfig::default();
        assert!(!config.is_blacklisted("http://bad"));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: SelectorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SelectorConfig::default());
    }

    #[test]
    fn test_duration_accessors() {
        let config = SelectorConfig {
            request_timeout_ms: 1_500,
            ..Default::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_millis(1_500));
        assert_eq!(config.unhealthy_ttl(), Duration::from_secs(3_600));
        assert_eq!(config.backups_ttl(), Duration::from_secs(120));
    }
}
