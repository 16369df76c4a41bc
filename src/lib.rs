//! # Endpoint Selector
//!
//! A library for selecting a healthy endpoint out of a dynamic pool of
//! backend services, by racing concurrent health checks and memoizing the
//! losers.
//!
//! ## Overview
//!
//! A [`ServiceProvider`] supplies the current candidate pool, an
//! [`EndpointSelector`] races bounded rounds of health probes against it,
//! and a [`SelectionPolicy`] customizes the three variable points: a
//! short-circuit pick, the health predicate, and the backup fallback choice.
//!
//! ```no_run
//! use std::sync::Arc;
//! use endpoint_selector::{EndpointSelector, SelectorConfig, StaticProvider};
//!
//! # async fn run() {
//! let provider = Arc::new(StaticProvider::new([
//!     "https://node1.example.com",
//!     "https://node2.example.com",
//! ]));
//! let selector = EndpointSelector::new(SelectorConfig::default(), provider).unwrap();
//! if let Some(endpoint) = selector.select().await {
//!     println!("selected {endpoint}");
//! }
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod services;
pub mod utils;

pub use config::SelectorConfig;
pub use errors::SelectorError;
pub use models::{Decision, DecisionStage, Service};
pub use services::health::{HealthChecker, ProbeResponse};
pub use services::provider::{ServiceProvider, StaticProvider};
pub use services::selection::{
    DefaultPolicy, EndpointSelector, FindAllOptions, HealthVerdict, SelectionPolicy,
    VersionGatedPolicy,
};
pub use utils::{health_check_url, mask_url};
