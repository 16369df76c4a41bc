//! Services module for endpoint selection.
//!
//! Contains the building blocks of the selector:
//!
//! - **health**: HTTP health-check probing
//! - **provider**: candidate supplier seam
//! - **selection**: the selection engine, its policies and state

pub mod health;
pub use health::*;

pub mod provider;
pub use provider::*;

pub mod selection;
pub use selection::*;
