//! # Block Descriptor
//!
//! Declarative definition of one block: 8 master corner points, cell counts,
//! grading and an optional cell zone.

use config::constants::MAX_POINTS;
use robust::{orient3d, Coord3D};
use serde::{Deserialize, Serialize};

use crate::error::{BlockMeshError, BlockMeshResult};
use crate::geometry::{BlockFace, Face, Point, HEX_CORNERS, HEX_EDGES};
use crate::grading::Grading;

/// Definition of a hexahedral block.
///
/// # Example
///
/// ```rust
/// use multiblock_mesh::descriptor::BlockDescriptor;
///
/// let block = BlockDescriptor::new([0, 1, 2, 3, 4, 5, 6, 7], [2, 3, 4]);
/// assert_eq!(block.n_points(), 3 * 4 * 5);
/// assert_eq!(block.n_cells(), 24);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDescriptor {
    /// Master point indices in hexahedron corner order
    pub corners: [usize; 8],
    /// Number of cells along x, y and z
    pub cells: [usize; 3],
    /// Expansion ratios
    #[serde(default)]
    pub grading: Grading,
    /// Cell zone the block's cells belong to
    #[serde(default)]
    pub zone: Option<String>,
}

impl BlockDescriptor {
    /// Creates a uniformly graded block without a zone.
    pub fn new(corners: [usize; 8], cells: [usize; 3]) -> Self {
        Self {
            corners,
            cells,
            grading: Grading::default(),
            zone: None,
        }
    }

    /// Sets the grading.
    pub fn with_grading(mut self, grading: Grading) -> Self {
        self.grading = grading;
        self
    }

    /// Sets the cell zone.
    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    /// Number of points of the block grid.
    pub fn n_points(&self) -> usize {
        self.cells.iter().map(|n| n + 1).product()
    }

    /// Number of cells of the block grid.
    pub fn n_cells(&self) -> usize {
        self.cells.iter().product()
    }

    /// Local label of grid point (i, j, k); i varies fastest, then j, then k.
    #[inline]
    pub fn vtx_label(&self, i: usize, j: usize, k: usize) -> usize {
        let [nx, ny, _] = self.cells;
        i + j * (nx + 1) + k * (nx + 1) * (ny + 1)
    }

    /// Grid position (i, j, k) of a local label.
    pub fn grid_position(&self, label: usize) -> [usize; 3] {
        let [nx, ny, _] = self.cells;
        let i = label % (nx + 1);
        let j = (label / (nx + 1)) % (ny + 1);
        let k = label / ((nx + 1) * (ny + 1));
        [i, j, k]
    }

    /// Master points of a logical face, outward orientation.
    pub fn face(&self, face: BlockFace) -> Face {
        Face::new(face.corners().map(|slot| self.corners[slot]))
    }

    /// Master points of all six logical faces, outward orientation.
    pub fn faces(&self) -> [Face; 6] {
        BlockFace::ALL.map(|f| self.face(f))
    }

    /// Master points (start, end) of hexahedron edge `edge`.
    pub fn edge(&self, edge: usize) -> (usize, usize) {
        let [s, t] = HEX_EDGES[edge];
        (self.corners[s], self.corners[t])
    }

    /// Corner positions in hexahedron order.
    pub fn corner_points(&self, points: &[Point]) -> [Point; 8] {
        self.corners.map(|c| points[c])
    }

    /// Validates the descriptor against the master point list.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming `block` for non-positive cell
    /// counts, too many points, unknown or repeated corners, or an inside-out
    /// or collapsed corner.
    pub fn validate(&self, block: usize, points: &[Point]) -> BlockMeshResult<()> {
        if self.cells.contains(&0) {
            return Err(BlockMeshError::configuration(
                block,
                format!("cell counts must be positive: {:?}", self.cells),
            ));
        }
        let n_points = self
            .cells
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n + 1))
            .unwrap_or(usize::MAX);
        if n_points > MAX_POINTS {
            return Err(BlockMeshError::configuration(
                block,
                format!("{n_points} points exceed the limit of {MAX_POINTS}"),
            ));
        }
        if let Some(&c) = self.corners.iter().find(|&&c| c >= points.len()) {
            return Err(BlockMeshError::configuration(
                block,
                format!("corner {c} is not one of the {} points", points.len()),
            ));
        }
        let mut sorted = self.corners;
        sorted.sort_unstable();
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            return Err(BlockMeshError::configuration(
                block,
                format!("corners repeat a point: {:?}", self.corners),
            ));
        }

        let corners = self.corner_points(points);
        for (slot, &[i, j, k]) in HEX_CORNERS.iter().enumerate() {
            if corner_volume_sign(&corners, slot, [i, j, k]) <= 0.0 {
                return Err(BlockMeshError::configuration(
                    block,
                    format!("block is inside-out or collapsed at corner {slot} (point {})", self.corners[slot]),
                ));
            }
        }

        Ok(())
    }
}

/// Oriented volume of the tetrahedron spanned by a corner and its three edge
/// neighbours, positive for a right-handed block.
fn corner_volume_sign(corners: &[Point; 8], slot: usize, ijk: [usize; 3]) -> f64 {
    let neighbour = |axis: usize| {
        let mut target = ijk;
        target[axis] ^= 1;
        let n = HEX_CORNERS
            .iter()
            .position(|c| *c == target)
            .unwrap_or(slot);
        corners[n]
    };
    let coord = |p: Point| Coord3D {
        x: p.x,
        y: p.y,
        z: p.z,
    };

    let flips = ijk.iter().filter(|&&v| v == 1).count();
    let sign = if flips % 2 == 0 { 1.0 } else { -1.0 };
    sign * orient3d(
        coord(neighbour(0)),
        coord(neighbour(1)),
        coord(neighbour(2)),
        coord(corners[slot]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn cube_points(origin: DVec3) -> Vec<Point> {
        HEX_CORNERS
            .iter()
            .map(|c| origin + DVec3::new(c[0] as f64, c[1] as f64, c[2] as f64))
            .collect()
    }

    #[test]
    fn test_valid_block() {
        let points = cube_points(DVec3::ZERO);
        let block = BlockDescriptor::new([0, 1, 2, 3, 4, 5, 6, 7], [2, 2, 2]);
        assert!(block.validate(0, &points).is_ok());
    }

    #[test]
    fn test_zero_cells_rejected() {
        let points = cube_points(DVec3::ZERO);
        let block = BlockDescriptor::new([0, 1, 2, 3, 4, 5, 6, 7], [2, 0, 2]);
        let err = block.validate(4, &points).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("block 4"));
    }

    #[test]
    fn test_inside_out_rejected() {
        let points = cube_points(DVec3::ZERO);
        // Top and bottom swapped: left-handed
        let block = BlockDescriptor::new([4, 5, 6, 7, 0, 1, 2, 3], [1, 1, 1]);
        assert!(block.validate(0, &points).is_err());
    }

    #[test]
    fn test_repeated_corner_rejected() {
        let points = cube_points(DVec3::ZERO);
        let block = BlockDescriptor::new([0, 1, 2, 3, 4, 5, 6, 6], [1, 1, 1]);
        assert!(block.validate(0, &points).is_err());
    }

    #[test]
    fn test_unknown_corner_rejected() {
        let points = cube_points(DVec3::ZERO);
        let block = BlockDescriptor::new([0, 1, 2, 3, 4, 5, 6, 8], [1, 1, 1]);
        assert!(block.validate(0, &points).is_err());
    }

    #[test]
    fn test_vtx_label_roundtrip() {
        let block = BlockDescriptor::new([0, 1, 2, 3, 4, 5, 6, 7], [3, 2, 4]);
        assert_eq!(block.vtx_label(0, 0, 0), 0);
        assert_eq!(block.vtx_label(3, 0, 0), 3);
        assert_eq!(block.vtx_label(0, 1, 0), 4);
        assert_eq!(block.vtx_label(0, 0, 1), 12);
        assert_eq!(block.vtx_label(3, 2, 4), block.n_points() - 1);
        assert_eq!(block.grid_position(block.vtx_label(2, 1, 3)), [2, 1, 3]);
    }

    #[test]
    fn test_faces_and_edges_use_master_points() {
        let block = BlockDescriptor::new([10, 11, 12, 13, 14, 15, 16, 17], [1, 1, 1]);
        assert_eq!(block.face(BlockFace::ZMax), Face::new([14, 15, 16, 17]));
        assert_eq!(block.edge(1), (13, 12));
        assert_eq!(block.faces()[0], Face::new([10, 14, 17, 13]));
    }
}
