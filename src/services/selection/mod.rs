//! # Endpoint Selection
//!
//! This module provides the selection engine for dynamically choosing a
//! healthy service endpoint out of a changing candidate pool.
//!
//! ## Features
//!
//! - **Health racing**: a bounded round of candidates is probed concurrently
//!   and the first passing endpoint wins
//! - **Unhealthy memoization**: failed endpoints are excluded from later
//!   rounds until a TTL elapses or the pool is exhausted and reset
//! - **Backup degradation**: reachable-but-degraded endpoints remain
//!   selectable as a last resort
//! - **List filtering**: optional allowlist/denylist restriction of the pool

use std::sync::Arc;

use rand::prelude::*;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::config::SelectorConfig;
use crate::errors::SelectorError;
use crate::models::{Decision, DecisionStage, Service};
use crate::services::health::HealthChecker;
use crate::services::provider::ServiceProvider;

pub mod policy;
pub use policy::*;

mod race;
mod state;

use race::race_round;
use state::SelectorState;

/// Options for [`EndpointSelector::find_all`].
#[derive(Clone, Debug, Default)]
pub struct FindAllOptions {
    /// Request verbose metadata from the candidate supplier.
    pub verbose: bool,
    /// Overrides the configured allowlist for this sweep only.
    pub whitelist: Option<std::collections::HashSet<String>>,
}

/// Selects healthy endpoints from a dynamic pool of backend services.
///
/// One instance is constructed per logical service pool and lives for the
/// owning session. `select` may be called repeatedly and concurrently; calls
/// share the unhealthy/backup state but are otherwise independent.
pub struct EndpointSelector {
    config: SelectorConfig,
    provider: Arc<dyn ServiceProvider>,
    policy: Arc<dyn SelectionPolicy>,
    checker: HealthChecker,
    state: Arc<SelectorState>,
}

impl EndpointSelector {
    /// Creates a selector with the base policy (HTTP 200 means healthy).
    ///
    /// # Returns
    /// * `Err(SelectorError::InvalidConfiguration)` when the configuration
    ///   fails validation.
    pub fn new(
        config: SelectorConfig,
        provider: Arc<dyn ServiceProvider>,
    ) -> Result<Self, SelectorError> {
        Self::with_policy(config, provider, Arc::new(DefaultPolicy))
    }

    /// Creates a selector with a custom [`SelectionPolicy`].
    pub fn with_policy(
        config: SelectorConfig,
        provider: Arc<dyn ServiceProvider>,
        policy: Arc<dyn SelectionPolicy>,
    ) -> Result<Self, SelectorError> {
        config.validate()?;
        let checker = HealthChecker::new(config.request_timeout())?;
        Ok(Self {
            config,
            provider,
            policy,
            checker,
            state: Arc::new(SelectorState::default()),
        })
    }

    /// Selects one healthy endpoint, or `None` when nothing is usable.
    ///
    /// Rounds of at most `max_concurrent_requests` randomly sampled
    /// candidates are raced until one passes the health predicate. Endpoints
    /// that fail are memoized as unhealthy and excluded from later rounds.
    /// When the pool is exhausted, a recorded backup is returned if one
    /// exists; otherwise the unhealthy/backup state is reset so the next
    /// call can reconsider everything, and `None` is returned.
    ///
    /// `None` is an expected outcome, not an error: callers apply their own
    /// retry policy at a higher level.
    pub async fn select(&self) -> Option<String> {
        self.state.reset_decision_tree();

        let shortcircuit = self.policy.short_circuit().await;
        self.state.push_decision(Decision {
            stage: DecisionStage::CheckShortCircuit,
            val: shortcircuit.clone().map(Value::String),
        });
        if let Some(endpoint) = shortcircuit {
            if !self.config.is_blacklisted(&endpoint) {
                info!(endpoint = %endpoint, "selected short-circuit endpoint");
                return Some(endpoint);
            }
        }

        let mut services: Vec<String> = match self.provider.get_services(false).await {
            Ok(services) => services.into_iter().map(|s| s.endpoint).collect(),
            Err(e) => {
                warn!(error = %e, "service provider failed, treating candidate pool as empty");
                Vec::new()
            }
        };
        self.state.push_decision(Decision::with_val(
            DecisionStage::GetAllServices,
            json!(services),
        ));

        if let Some(whitelist) = &self.config.whitelist {
            services.retain(|s| whitelist.contains(s));
            self.state.push_decision(Decision::with_val(
                DecisionStage::FilterToWhitelist,
                json!(services),
            ));
        }
        if let Some(blacklist) = &self.config.blacklist {
            services.retain(|s| !blacklist.contains(s));
            self.state.push_decision(Decision::with_val(
                DecisionStage::FilterFromBlacklist,
                json!(services),
            ));
        }

        // Iterative rounds instead of recursion: each failed round shrinks
        // the remaining pool, so this terminates.
        let mut rounds_raced = 0usize;
        loop {
            let filtered: Vec<String> = {
                let unhealthy = self.state.unhealthy.lock();
                services
                    .iter()
                    .filter(|s| !unhealthy.contains(*s))
                    .cloned()
                    .collect()
            };
            self.state.push_decision(Decision::with_val(
                DecisionStage::FilterOutKnownUnhealthy,
                json!(filtered),
            ));

            if filtered.is_empty() {
                self.state
                    .push_decision(Decision::new(DecisionStage::NoServicesLeftToTry));

                if let Some(backup) = self.pick_backup() {
                    self.state.push_decision(Decision::with_val(
                        DecisionStage::SelectedFromBackup,
                        Value::String(backup.clone()),
                    ));
                    info!(endpoint = %backup, "no clean candidate, selected backup endpoint");
                    return Some(backup);
                }

                if rounds_raced == 0 {
                    // Exhausted before probing anything this call: give every
                    // endpoint a fresh chance next time.
                    self.state.clear_unhealthy();
                    self.state.clear_backups();
                    self.state
                        .push_decision(Decision::new(DecisionStage::FailedAndResetting));
                }
                error!(
                    decision_tree = %self.decision_tree_json(),
                    "failed to select a healthy endpoint"
                );
                return None;
            }

            let round = Self::sample_round(&filtered, self.config.max_concurrent_requests);
            self.state.push_decision(Decision::with_val(
                DecisionStage::GetSelectionRound,
                json!(round),
            ));
            self.state.record_attempts(round.len());

            let outcome = race_round(&self.checker, self.policy.as_ref(), &round).await;
            rounds_raced += 1;

            let touched = !outcome.errored.is_empty() || !outcome.backups.is_empty();
            for (endpoint, body) in outcome.backups {
                self.state.add_backup(&endpoint, body);
            }
            for endpoint in &outcome.errored {
                self.state.add_unhealthy(endpoint);
            }
            if touched {
                self.trigger_cleanup();
            }

            if let Some(best) = outcome.best {
                self.state.push_decision(Decision::with_val(
                    DecisionStage::MadeASelection,
                    Value::String(best.clone()),
                ));
                info!(
                    endpoint = %best,
                    attempts = self.total_attempts(),
                    "selected healthy endpoint"
                );
                return Some(best);
            }

            self.state
                .push_decision(Decision::new(DecisionStage::RoundFailedRetry));
        }
    }

    /// Exhaustively health-checks every candidate and returns the healthy
    /// ones, with verbose metadata when requested.
    ///
    /// Unlike `select`, the sweep is not bounded by
    /// `max_concurrent_requests` and does not touch the unhealthy/backup
    /// state; it is a diagnostic listing. A sweep-level failure degrades to
    /// an empty list.
    pub async fn find_all(&self, options: FindAllOptions) -> Vec<Service> {
        let services = match self.provider.get_services(options.verbose).await {
            Ok(services) => services,
            Err(e) => {
                warn!(error = %e, "service provider failed during health sweep");
                return Vec::new();
            }
        };

        let candidates: Vec<Service> = match &options.whitelist {
            Some(whitelist) => services
                .into_iter()
                .filter(|s| whitelist.contains(&s.endpoint))
                .collect(),
            None => services,
        };

        let probes = candidates.into_iter().map(|service| async move {
            let result = self.checker.probe(&service.endpoint).await;
            (service, result)
        });
        let results = futures::future::join_all(probes).await;

        results
            .into_iter()
            .filter_map(|(mut service, result)| match result {
                Ok(response) if self.policy.classify(&response) == HealthVerdict::Healthy => {
                    if service.data.is_none() {
                        service.data = response.body;
                    }
                    Some(service)
                }
                _ => None,
            })
            .collect()
    }

    /// Marks an endpoint as unhealthy.
    pub fn add_unhealthy(&self, endpoint: &str) {
        self.state.add_unhealthy(endpoint);
    }

    /// Removes an endpoint from the unhealthy set.
    pub fn remove_from_unhealthy(&self, endpoint: &str) {
        self.state.remove_from_unhealthy(endpoint);
    }

    /// Clears the unhealthy set.
    pub fn clear_unhealthy(&self) {
        self.state.clear_unhealthy();
    }

    /// Records an endpoint as a backup, keyed to the health-check body that
    /// justified the downgrade.
    pub fn add_backup(&self, endpoint: &str, body: Value) {
        self.state.add_backup(endpoint, body);
    }

    /// Removes an endpoint from the backups map.
    pub fn remove_from_backups(&self, endpoint: &str) {
        self.state.remove_from_backups(endpoint);
    }

    /// Clears the backups map.
    pub fn clear_backups(&self) {
        self.state.clear_backups();
    }

    /// Cancels any pending cleanup timers and reschedules both TTL clears
    /// from now. Must be called from within a tokio runtime.
    pub fn trigger_cleanup(&self) {
        self.state
            .trigger_cleanup(self.config.unhealthy_ttl(), self.config.backups_ttl());
    }

    /// Total endpoints probed over the lifetime of this instance.
    pub fn total_attempts(&self) -> u64 {
        self.state
            .total_attempts
            .load(std::sync::atomic::Ordering::Relaxed)
    }

    /// Number of endpoints currently memoized as unhealthy.
    pub fn unhealthy_size(&self) -> usize {
        self.state.unhealthy.lock().len()
    }

    /// Number of endpoints currently recorded as backups.
    pub fn backups_size(&self) -> usize {
        self.state.backups.lock().len()
    }

    /// The decision log of the most recent `select` call.
    pub fn decision_tree(&self) -> Vec<Decision> {
        self.state.decision_tree.lock().clone()
    }

    fn decision_tree_json(&self) -> String {
        serde_json::to_string(&self.decision_tree()).unwrap_or_default()
    }

    /// Picks a backup through the policy, never returning a denylisted
    /// endpoint.
    fn pick_backup(&self) -> Option<String> {
        let eligible: Vec<(String, Value)> = {
            let backups = self.state.backups.lock();
            if backups.is_empty() {
                return None;
            }
            backups
                .entries()
                .iter()
                .filter(|(endpoint, _)| !self.config.is_blacklisted(endpoint))
                .cloned()
                .collect()
        };
        if eligible.is_empty() {
            return None;
        }
        self.policy.select_from_backups(&eligible)
    }

    /// Uniform random sample without replacement of at most `size` members.
    fn sample_round(pool: &[String], size: usize) -> Vec<String> {
        let mut rng = rand::rng();
        pool.choose_multiple(&mut rng, size).cloned().collect()
    }
}
