//! Candidate supplier seam.
//!
//! The selector does not own the service registry; a `ServiceProvider`
//! supplies the current candidate pool on every selection. Membership is
//! dynamic, so repeated calls may return different sets.

use async_trait::async_trait;

use crate::errors::SelectorError;
use crate::models::Service;

/// Supplies the current pool of candidate service endpoints.
#[async_trait]
pub trait ServiceProvider: Send + Sync {
    /// Returns the current candidate list.
    ///
    /// # Arguments
    /// * `verbose` - when true, include whatever metadata the registry holds
    ///   for each service (version, block height, etc.)
    async fn get_services(&self, verbose: bool) -> Result<Vec<Service>, SelectorError>;
}

/// A fixed candidate pool. Useful for tests and for callers whose registry
/// is resolved once at startup.
#[derive(Clone, Debug, Default)]
pub struct StaticProvider {
    services: Vec<Service>,
}

impl StaticProvider {
    pub fn new(endpoints: impl IntoIterator<Item = impl Into<Service>>) -> Self {
        Self {
            services: endpoints.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl ServiceProvider for StaticProvider {
    async fn get_services(&self, _verbose: bool) -> Result<Vec<Service>, SelectorError> {
        Ok(self.services.clone())
    }
}
