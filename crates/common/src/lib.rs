//! Attentive Common Utilities
//!
//! Shared infrastructure for all Attentive crates:
//! - Error types and result aliases
//! - Session clock and frame gating
//! - Tracing/logging initialization
//! - Detector and application configuration

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
