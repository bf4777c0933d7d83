//! # Grading
//!
//! Expansion-ratio grading along block edges. The expansion ratio is the width
//! of the last cell divided by the width of the first cell along an edge.

use config::constants::UNIFORM_GRADING_TOLERANCE;
use serde::{Deserialize, Serialize};

use crate::error::{BlockMeshError, BlockMeshResult};

/// Cell expansion ratios of a block.
///
/// # Example
///
/// ```rust
/// use multiblock_mesh::grading::Grading;
///
/// let grading = Grading::Simple([1.0, 2.0, 1.0]);
/// let ratios = grading.edge_ratios();
/// assert_eq!(ratios[4], 2.0); // first y edge
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Grading {
    /// One expansion ratio per parametric direction.
    Simple([f64; 3]),
    /// One expansion ratio per hexahedron edge, in model edge order.
    Edge([f64; 12]),
}

impl Default for Grading {
    fn default() -> Self {
        Grading::Simple([1.0; 3])
    }
}

impl Grading {
    /// Uniform grading in all directions.
    pub fn uniform() -> Self {
        Self::default()
    }

    /// Expands the ratios to one ratio per hexahedron edge.
    pub fn edge_ratios(&self) -> [f64; 12] {
        match self {
            Grading::Simple(ratios) => std::array::from_fn(|e| ratios[e / 4]),
            Grading::Edge(ratios) => *ratios,
        }
    }
}

/// Computes the `n + 1` edge fractions for `n` cells and an expansion ratio.
///
/// Fractions start at exactly 0.0, end at exactly 1.0 and increase strictly.
///
/// # Errors
///
/// Returns a configuration error for a zero cell count, a non-positive or
/// non-finite ratio, or fractions that fail to increase.
///
/// # Example
///
/// ```rust
/// use multiblock_mesh::grading::edge_fractions;
///
/// let lambda = edge_fractions(0, 4, 1.0).unwrap();
/// assert_eq!(lambda, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
/// ```
pub fn edge_fractions(block: usize, n: usize, ratio: f64) -> BlockMeshResult<Vec<f64>> {
    if n == 0 {
        return Err(BlockMeshError::configuration(
            block,
            "cell count along an edge must be positive",
        ));
    }
    if !(ratio > 0.0) || !ratio.is_finite() {
        return Err(BlockMeshError::configuration(
            block,
            format!("expansion ratio must be positive and finite: {ratio}"),
        ));
    }

    let mut lambda = Vec::with_capacity(n + 1);
    if n == 1 || (ratio - 1.0).abs() < UNIFORM_GRADING_TOLERANCE {
        lambda.extend((0..=n).map(|i| i as f64 / n as f64));
    } else {
        // Geometric progression of cell widths: w_{i+1} = g * w_i
        let g = ratio.powf(1.0 / (n - 1) as f64);
        let denom = 1.0 - g.powi(n as i32);
        lambda.extend((0..=n).map(|i| (1.0 - g.powi(i as i32)) / denom));
    }
    lambda[0] = 0.0;
    lambda[n] = 1.0;

    if let Some(i) = lambda.windows(2).position(|w| !(w[1] > w[0])) {
        return Err(BlockMeshError::configuration(
            block,
            format!("grading with ratio {ratio} over {n} cells is not monotonic at division {i}"),
        ));
    }

    Ok(lambda)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_fractions() {
        let lambda = edge_fractions(0, 2, 1.0).unwrap();
        assert_eq!(lambda, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_single_cell_ignores_ratio() {
        let lambda = edge_fractions(0, 1, 10.0).unwrap();
        assert_eq!(lambda, vec![0.0, 1.0]);
    }

    #[test]
    fn test_expansion_ratio_is_last_over_first() {
        let lambda = edge_fractions(0, 5, 4.0).unwrap();
        let first = lambda[1] - lambda[0];
        let last = lambda[5] - lambda[4];
        assert_relative_eq!(last / first, 4.0, epsilon = 1e-12);
        assert_eq!(lambda[0], 0.0);
        assert_eq!(lambda[5], 1.0);
    }

    #[test]
    fn test_contracting_grading_is_monotonic() {
        let lambda = edge_fractions(0, 10, 0.1).unwrap();
        assert!(lambda.windows(2).all(|w| w[1] > w[0]));
        let first = lambda[1] - lambda[0];
        let last = lambda[10] - lambda[9];
        assert!(first > last);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(edge_fractions(2, 0, 1.0).unwrap_err().is_configuration());
        assert!(edge_fractions(2, 3, 0.0).is_err());
        assert!(edge_fractions(2, 3, -1.0).is_err());
        assert!(edge_fractions(2, 3, f64::NAN).is_err());
    }

    #[test]
    fn test_edge_ratios_expand_simple_grading() {
        let ratios = Grading::Simple([1.0, 2.0, 3.0]).edge_ratios();
        assert_eq!(&ratios[0..4], &[1.0; 4]);
        assert_eq!(&ratios[4..8], &[2.0; 4]);
        assert_eq!(&ratios[8..12], &[3.0; 4]);
    }
}
