//! # Tests for Config Constants
//!
//! Unit tests verifying the relationships between configuration constants.

use crate::constants::*;

// =============================================================================
// PRECISION TESTS
// =============================================================================

#[test]
fn test_epsilon_is_small() {
    assert!(EPSILON_TOLERANCE > 0.0, "EPSILON_TOLERANCE must be positive");
    assert!(EPSILON_TOLERANCE < 1e-6, "EPSILON_TOLERANCE should be small for precision");
}

#[test]
fn test_merge_tolerance_larger_than_epsilon() {
    assert!(
        MERGE_TOLERANCE >= EPSILON_TOLERANCE,
        "MERGE_TOLERANCE should be >= EPSILON_TOLERANCE"
    );
}

#[test]
fn test_uniform_grading_tolerance_is_tight() {
    assert!(UNIFORM_GRADING_TOLERANCE <= MERGE_TOLERANCE);
}

// =============================================================================
// LIMIT TESTS
// =============================================================================

#[test]
fn test_max_points_fits_u32_meshes() {
    // Downstream containers index points with 32-bit labels
    assert!(MAX_POINTS <= u32::MAX as usize);
}

#[test]
fn test_default_config_matches_constants() {
    let cfg = GlobalConfig::default();
    assert_eq!(cfg.tolerance, EPSILON_TOLERANCE);
    assert_eq!(cfg.search_length, DEFAULT_SEARCH_LENGTH);
}

#[test]
fn test_config_error_display() {
    let err = ConfigError::InvalidScale(0.0);
    assert!(err.to_string().contains("scale factor"));
}
