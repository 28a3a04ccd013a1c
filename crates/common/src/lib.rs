//! Clipsmith Common Utilities
//!
//! Shared infrastructure for all Clipsmith crates:
//! - Error taxonomy and result aliases
//! - Tracing/logging initialization
//! - Configuration loading and the per-run pipeline configuration

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;
