//! # Global Mesh
//!
//! Final merged mesh: global points, hexahedral cells, named boundary patches
//! and cell zones.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::geometry::{Face, HexCell, Point};
use crate::topology::PatchKind;

/// A named group of boundary faces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    /// Patch name
    pub name: String,
    /// Boundary condition category
    pub kind: PatchKind,
    /// Outward faces referencing global points
    pub faces: Vec<Face>,
}

/// A named group of cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellZone {
    /// Zone name
    pub name: String,
    /// Global cell indices, ascending
    pub cells: Vec<usize>,
}

/// The merged mesh of all blocks.
///
/// Built once by [`BlockMesh::build`](crate::BlockMesh::build); only
/// [`GlobalMesh::scale`] changes it afterwards.
///
/// # Example
///
/// ```rust
/// use multiblock_mesh::GlobalMesh;
/// use multiblock_mesh::geometry::HexCell;
/// use glam::DVec3;
///
/// let mut mesh = GlobalMesh::new(
///     vec![
///         DVec3::new(0.0, 0.0, 0.0),
///         DVec3::new(1.0, 0.0, 0.0),
///         DVec3::new(1.0, 1.0, 0.0),
///         DVec3::new(0.0, 1.0, 0.0),
///         DVec3::new(0.0, 0.0, 1.0),
///         DVec3::new(1.0, 0.0, 1.0),
///         DVec3::new(1.0, 1.0, 1.0),
///         DVec3::new(0.0, 1.0, 1.0),
///     ],
///     vec![HexCell([0, 1, 2, 3, 4, 5, 6, 7])],
/// );
/// assert!(mesh.validate());
/// mesh.scale(2.0);
/// assert_eq!(mesh.bounding_box().1, DVec3::splat(2.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalMesh {
    /// Point positions
    points: Vec<Point>,
    /// Cells in block order
    cells: Vec<HexCell>,
    /// Boundary patches in declaration order
    patches: Vec<Patch>,
    /// Cell zones in order of first appearance
    cell_zones: Vec<CellZone>,
    /// Projected points that kept their unprojected position
    projection_misses: usize,
}

impl GlobalMesh {
    /// Creates a mesh without patches or zones.
    pub fn new(points: Vec<Point>, cells: Vec<HexCell>) -> Self {
        Self {
            points,
            cells,
            ..Self::default()
        }
    }

    /// Sets the boundary patches.
    pub fn with_patches(mut self, patches: Vec<Patch>) -> Self {
        self.patches = patches;
        self
    }

    /// Sets the cell zones.
    pub fn with_cell_zones(mut self, zones: Vec<CellZone>) -> Self {
        self.cell_zones = zones;
        self
    }

    /// Sets the number of projection misses.
    pub fn with_projection_misses(mut self, misses: usize) -> Self {
        self.projection_misses = misses;
        self
    }

    /// Returns the number of points.
    #[inline]
    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    /// Returns the number of cells.
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// Returns the number of patches.
    #[inline]
    pub fn n_patches(&self) -> usize {
        self.patches.len()
    }

    /// Returns a reference to the points.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Returns a reference to the cells.
    #[inline]
    pub fn cells(&self) -> &[HexCell] {
        &self.cells
    }

    /// Returns a reference to the patches.
    #[inline]
    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    /// Returns the patch with the given name.
    pub fn patch(&self, name: &str) -> Option<&Patch> {
        self.patches.iter().find(|p| p.name == name)
    }

    /// Returns a reference to the cell zones.
    #[inline]
    pub fn cell_zones(&self) -> &[CellZone] {
        &self.cell_zones
    }

    /// Number of projected points that found no surface.
    #[inline]
    pub fn projection_misses(&self) -> usize {
        self.projection_misses
    }

    /// Total number of boundary faces over all patches.
    pub fn n_boundary_faces(&self) -> usize {
        self.patches.iter().map(|p| p.faces.len()).sum()
    }

    /// Multiplies every point by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for p in &mut self.points {
            *p *= factor;
        }
    }

    /// Computes the axis-aligned bounding box.
    ///
    /// Returns (min, max) corners of the bounding box.
    pub fn bounding_box(&self) -> (DVec3, DVec3) {
        let Some((first, rest)) = self.points.split_first() else {
            return (DVec3::ZERO, DVec3::ZERO);
        };
        rest.iter()
            .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)))
    }

    /// Validates the mesh for correctness.
    ///
    /// Checks:
    /// - All cell and face indices are valid
    /// - No cell or face repeats a point
    /// - Zone cell indices are valid
    ///
    /// Returns true if valid.
    pub fn validate(&self) -> bool {
        let n = self.points.len();
        let cells_ok = self
            .cells
            .iter()
            .all(|c| c.points().iter().all(|&p| p < n) && !c.is_degenerate());
        let faces_ok = self
            .patches
            .iter()
            .flat_map(|p| &p.faces)
            .all(|f| f.points().iter().all(|&p| p < n) && !f.is_degenerate());
        let zones_ok = self
            .cell_zones
            .iter()
            .flat_map(|z| &z.cells)
            .all(|&c| c < self.cells.len());
        cells_ok && faces_ok && zones_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube() -> GlobalMesh {
        let points = crate::geometry::HEX_CORNERS
            .iter()
            .map(|c| DVec3::new(c[0] as f64, c[1] as f64, c[2] as f64))
            .collect();
        GlobalMesh::new(points, vec![HexCell([0, 1, 2, 3, 4, 5, 6, 7])])
    }

    #[test]
    fn test_mesh_new() {
        let mesh = GlobalMesh::default();
        assert_eq!(mesh.n_points(), 0);
        assert_eq!(mesh.n_cells(), 0);
        assert_eq!(mesh.bounding_box(), (DVec3::ZERO, DVec3::ZERO));
    }

    #[test]
    fn test_mesh_scale() {
        let mut mesh = unit_cube();
        mesh.scale(0.5);
        let (min, max) = mesh.bounding_box();
        assert_eq!(min, DVec3::ZERO);
        assert_eq!(max, DVec3::splat(0.5));
    }

    #[test]
    fn test_mesh_validate_invalid_index() {
        let mesh = GlobalMesh::new(vec![DVec3::ZERO], vec![HexCell([0, 1, 2, 3, 4, 5, 6, 7])]);
        assert!(!mesh.validate());
    }

    #[test]
    fn test_mesh_validate_patch_faces() {
        let mesh = unit_cube().with_patches(vec![Patch {
            name: "walls".into(),
            kind: PatchKind::Wall,
            faces: vec![Face::new([0, 3, 2, 2])],
        }]);
        assert!(!mesh.validate());
    }

    #[test]
    fn test_mesh_zones_and_lookup() {
        let mesh = unit_cube()
            .with_patches(vec![Patch {
                name: "bottom".into(),
                kind: PatchKind::Wall,
                faces: vec![Face::new([0, 3, 2, 1])],
            }])
            .with_cell_zones(vec![CellZone {
                name: "fluid".into(),
                cells: vec![0],
            }]);
        assert!(mesh.validate());
        assert_eq!(mesh.n_boundary_faces(), 1);
        assert_eq!(mesh.patch("bottom").map(|p| p.kind), Some(PatchKind::Wall));
        assert!(mesh.patch("top").is_none());
    }
}
