//! # Config Crate
//!
//! Centralized configuration constants for the multi-block meshing pipeline.
//! All magic numbers and tunable parameters are defined here to ensure
//! consistency across crates and easy configuration management.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{GlobalConfig, EPSILON_TOLERANCE, DEFAULT_SEARCH_LENGTH};
//!
//! let value: f64 = 1.0e-12;
//! assert!(value.abs() < EPSILON_TOLERANCE);
//!
//! let cfg = GlobalConfig::default();
//! assert_eq!(cfg.search_length, DEFAULT_SEARCH_LENGTH);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **Explicit Settings**: Verbosity travels inside [`constants::GlobalConfig`],
//!   never through process-wide state
//! - **Validated**: Invalid values are rejected with [`constants::ConfigError`]

pub mod constants;

#[cfg(test)]
mod tests;
