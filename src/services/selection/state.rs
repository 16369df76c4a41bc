//! Selector state container.
//!
//! Owns the unhealthy set, the backups map, the attempt counter and the
//! decision log for one selector instance, plus the two debounced TTL
//! cleanup tasks. State is never shared across instances.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::models::Decision;

/// Backups map preserving insertion order, so the default "first backup"
/// fallback pick is deterministic.
#[derive(Debug, Default)]
pub(crate) struct BackupMap {
    entries: Vec<(String, Value)>,
}

impl BackupMap {
    pub fn insert(&mut self, endpoint: String, body: Value) {
        match self.entries.iter_mut().find(|(e, _)| *e == endpoint) {
            Some((_, existing)) => *existing = body,
            None => self.entries.push((endpoint, body)),
        }
    }

    pub fn remove(&mut self, endpoint: &str) {
        self.entries.retain(|(e, _)| e != endpoint);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }
}

/// Mutable state owned by one `EndpointSelector`.
#[derive(Debug, Default)]
pub(crate) struct SelectorState {
    pub unhealthy: Mutex<HashSet<String>>,
    pub backups: Mutex<BackupMap>,
    pub total_attempts: AtomicU64,
    pub decision_tree: Mutex<Vec<Decision>>,
    unhealthy_cleanup: Mutex<Option<JoinHandle<()>>>,
    backups_cleanup: Mutex<Option<JoinHandle<()>>>,
}

impl SelectorState {
    pub fn add_unhealthy(&self, endpoint: &str) {
        self.unhealthy.lock().insert(endpoint.to_string());
    }

    pub fn remove_from_unhealthy(&self, endpoint: &str) {
        self.unhealthy.lock().remove(endpoint);
    }

    pub fn clear_unhealthy(&self) {
        self.unhealthy.lock().clear();
    }

    pub fn add_backup(&self, endpoint: &str, body: Value) {
        self.backups.lock().insert(endpoint.to_string(), body);
    }

    pub fn remove_from_backups(&self, endpoint: &str) {
        self.backups.lock().remove(endpoint);
    }

    pub fn clear_backups(&self) {
        self.backups.lock().clear();
    }

    pub fn record_attempts(&self, count: usize) {
        self.total_attempts.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn push_decision(&self, decision: Decision) {
        self.decision_tree.lock().push(decision);
    }

    pub fn reset_decision_tree(&self) {
        self.decision_tree.lock().clear();
    }

    /// Cancels any pending cleanup timers and reschedules both from now.
    ///
    /// Debounced: each call aborts the previously scheduled task before
    /// spawning a new one, so at most one timer per TTL is pending. The
    /// spawned tasks hold only a weak reference; dropping the selector lets
    /// the state be freed without waiting for the TTLs to fire.
    pub fn trigger_cleanup(self: &Arc<Self>, unhealthy_ttl: Duration, backups_ttl: Duration) {
        let weak: Weak<Self> = Arc::downgrade(self);
        {
            let mut handle = self.unhealthy_cleanup.lock();
            if let Some(previous) = handle.take() {
                previous.abort();
            }
            let weak = weak.clone();
            *handle = Some(tokio::spawn(async move {
                tokio::time::sleep(unhealthy_ttl).await;
                if let Some(state) = weak.upgrade() {
                    debug!("unhealthy TTL elapsed, clearing unhealthy set");
                    state.clear_unhealthy();
                }
            }));
        }
        {
            let mut handle = self.backups_cleanup.lock();
            if let Some(previous) = handle.take() {
                previous.abort();
            }
            *handle = Some(tokio::spawn(async move {
                tokio::time::sleep(backups_ttl).await;
                if let Some(state) = weak.upgrade() {
                    debug!("backups TTL elapsed, clearing backups map");
                    state.clear_backups();
                }
            }));
        }
    }
}

impl Drop for SelectorState {
    fn drop(&mut self) {
        if let Some(handle) = self.unhealthy_cleanup.lock().take() {
            handle.abort();
        }
        if let Some(handle) = self.backups_cleanup.lock().take() {
            handle.abort();
        }
    }
}
