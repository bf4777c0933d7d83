//! Centralized configuration values shared across the block meshing crates.
//!
//! Each public item in this module documents its purpose and provides a minimal
//! usage example so that downstream crates can remain declarative and avoid
//! scattering literals.

use std::fmt;

/// Numerical tolerance used by geometry kernels.
///
/// # Examples
/// ```
/// use config::constants::EPSILON_TOLERANCE;
/// assert!(EPSILON_TOLERANCE < 1.0e-6);
/// ```
pub const EPSILON_TOLERANCE: f64 = 1.0e-9;

/// Default distance along the point normal searched for a surface hit when a
/// projection does not name its own search length.
///
/// # Examples
/// ```
/// use config::constants::DEFAULT_SEARCH_LENGTH;
/// assert!(DEFAULT_SEARCH_LENGTH > 0.0);
/// ```
pub const DEFAULT_SEARCH_LENGTH: f64 = 1.0;

/// Relative distance, measured against the local block size, above which two
/// block-local points merged into one global point are reported as not
/// coincident.
///
/// # Examples
/// ```
/// use config::constants::MERGE_TOLERANCE;
/// let block_size = 2.0;
/// assert!(MERGE_TOLERANCE * block_size < 1.0e-3);
/// ```
pub const MERGE_TOLERANCE: f64 = 1.0e-6;

/// Expansion ratios closer than this to one are treated as uniform grading.
///
/// # Examples
/// ```
/// use config::constants::UNIFORM_GRADING_TOLERANCE;
/// let ratio: f64 = 1.0 + 1.0e-12;
/// assert!((ratio - 1.0).abs() < UNIFORM_GRADING_TOLERANCE);
/// ```
pub const UNIFORM_GRADING_TOLERANCE: f64 = 1.0e-10;

/// Maximum number of points a single block mesh may produce.
///
/// Safety limit against runaway cell counts in a block declaration.
///
/// # Examples
/// ```
/// use config::constants::MAX_POINTS;
/// assert!(MAX_POINTS >= 1_000_000);
/// ```
pub const MAX_POINTS: usize = 100_000_000;

/// Immutable snapshot of global configuration settings that can be shared
/// between crates.
///
/// # Examples
/// ```
/// use config::constants::GlobalConfig;
/// let config = GlobalConfig::default();
/// assert!(config.tolerance > 0.0);
/// assert!(!config.verbose);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalConfig {
    /// Numeric tolerance propagated into geometry kernels.
    pub tolerance: f64,
    /// Default projection search length.
    pub search_length: f64,
    /// Report meshing progress at `info` level instead of `debug`.
    pub verbose: bool,
}

impl GlobalConfig {
    /// Builds a configuration enforcing strict validation of the supplied
    /// tolerance and search length.
    ///
    /// # Examples
    /// ```
    /// use config::constants::GlobalConfig;
    /// let cfg = GlobalConfig::new(1.0e-6, 0.5, true).expect("valid config");
    /// assert_eq!(cfg.search_length, 0.5);
    /// ```
    pub fn new(tolerance: f64, search_length: f64, verbose: bool) -> Result<Self, ConfigError> {
        if !(tolerance > 0.0) || !tolerance.is_finite() {
            return Err(ConfigError::InvalidTolerance(tolerance));
        }
        if !(search_length >= 0.0) || !search_length.is_finite() {
            return Err(ConfigError::InvalidSearchLength(search_length));
        }
        Ok(Self {
            tolerance,
            search_length,
            verbose,
        })
    }

    /// Returns a copy with the verbose flag set.
    pub fn with_verbose(self, verbose: bool) -> Self {
        Self { verbose, ..self }
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            tolerance: EPSILON_TOLERANCE,
            search_length: DEFAULT_SEARCH_LENGTH,
            verbose: false,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Raised when tolerance is zero, negative or not finite.
    InvalidTolerance(f64),
    /// Raised when the search length is negative or not finite.
    InvalidSearchLength(f64),
    /// Raised when the output scale factor is zero, negative or not finite.
    InvalidScale(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidTolerance(value) => {
                write!(f, "tolerance must be positive: {value}")
            }
            ConfigError::InvalidSearchLength(value) => {
                write!(f, "search length must be non-negative: {value}")
            }
            ConfigError::InvalidScale(value) => {
                write!(f, "scale factor must be positive: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validates an output scale factor.
///
/// # Examples
/// ```
/// use config::constants::validate_scale;
/// assert!(validate_scale(0.001).is_ok());
/// assert!(validate_scale(0.0).is_err());
/// ```
pub fn validate_scale(scale: f64) -> Result<f64, ConfigError> {
    if scale > 0.0 && scale.is_finite() {
        Ok(scale)
    } else {
        Err(ConfigError::InvalidScale(scale))
    }
}
