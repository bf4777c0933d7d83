//! # Geometric Primitives
//!
//! Points, quad faces, hexahedral cells and the fixed hexahedron model
//! (corner, edge and face numbering) every block follows.
//!
//! ## Hexahedron Model
//!
//! ```text
//!        7 ---------- 6
//!       /|           /|        z
//!      4 ---------- 5 |        |  y
//!      | |          | |        | /
//!      | 3 ---------|-2        |/
//!      |/           |/         +---- x
//!      0 ---------- 1
//! ```
//!
//! Faces are listed with outward-pointing normals (right-hand rule).

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A point in 3D space.
pub type Point = DVec3;

/// Parametric (x, y, z) coordinates of the 8 hexahedron corners.
pub const HEX_CORNERS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 1, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [1, 1, 1],
    [0, 1, 1],
];

/// The 12 hexahedron edges as (start, end) corner pairs.
///
/// Edges 0..4 run along x, 4..8 along y and 8..12 along z. Each edge starts at
/// the corner with the lower parametric coordinate.
pub const HEX_EDGES: [[usize; 2]; 12] = [
    [0, 1],
    [3, 2],
    [7, 6],
    [4, 5],
    [0, 3],
    [1, 2],
    [5, 6],
    [4, 7],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

/// The 6 hexahedron faces with outward orientation, in [`BlockFace`] order.
pub const HEX_FACES: [[usize; 4]; 6] = [
    [0, 4, 7, 3],
    [1, 2, 6, 5],
    [0, 1, 5, 4],
    [3, 7, 6, 2],
    [0, 3, 2, 1],
    [4, 5, 6, 7],
];

/// Returns the parametric axis (0 = x, 1 = y, 2 = z) an edge runs along.
#[inline]
pub fn edge_axis(edge: usize) -> usize {
    edge / 4
}

/// Returns the hexahedron edge joining two corners, if they are joined by one.
///
/// The flag is true when the edge runs from `b` to `a`.
pub fn edge_between(a: usize, b: usize) -> Option<(usize, bool)> {
    HEX_EDGES.iter().enumerate().find_map(|(e, &[s, t])| {
        if s == a && t == b {
            Some((e, false))
        } else if s == b && t == a {
            Some((e, true))
        } else {
            None
        }
    })
}

/// Straight interpolation that returns `a` at 0 and `b` at 1 exactly.
///
/// Every straight-line position in the crate goes through this form, so a
/// projection that falls back reproduces the unprojected point bit for bit.
#[inline]
pub fn chord(a: Point, b: Point, t: f64) -> Point {
    a * (1.0 - t) + b * t
}

/// One of the six logical faces of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlockFace {
    /// i = 0
    XMin,
    /// i = nx
    XMax,
    /// j = 0
    YMin,
    /// j = ny
    YMax,
    /// k = 0
    ZMin,
    /// k = nz
    ZMax,
}

impl BlockFace {
    /// All faces in model order.
    pub const ALL: [BlockFace; 6] = [
        BlockFace::XMin,
        BlockFace::XMax,
        BlockFace::YMin,
        BlockFace::YMax,
        BlockFace::ZMin,
        BlockFace::ZMax,
    ];

    /// Returns the face for a model index (0..6).
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Returns the model index (0..6).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the axis normal to this face.
    #[inline]
    pub fn axis(self) -> usize {
        self.index() / 2
    }

    /// Returns true for the face at the upper end of its axis.
    #[inline]
    pub fn is_max(self) -> bool {
        self.index() % 2 == 1
    }

    /// Returns the corner slots of this face with outward orientation.
    #[inline]
    pub fn corners(self) -> [usize; 4] {
        HEX_FACES[self.index()]
    }
}

/// A quadrilateral face given as an ordered loop of point indices.
///
/// # Example
///
/// ```rust
/// use multiblock_mesh::geometry::Face;
///
/// let a = Face::new([0, 1, 2, 3]);
/// let b = Face::new([2, 1, 0, 3]);
/// assert!(a.opposite_loop(&b));
/// assert_eq!(a.sorted_key(), b.sorted_key());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Face(pub [usize; 4]);

impl Face {
    /// Creates a face from four point indices.
    pub fn new(points: [usize; 4]) -> Self {
        Self(points)
    }

    /// Returns the point indices.
    #[inline]
    pub fn points(&self) -> [usize; 4] {
        self.0
    }

    /// Returns the face with reversed orientation, keeping the first point.
    pub fn reversed(&self) -> Self {
        let [a, b, c, d] = self.0;
        Self([a, d, c, b])
    }

    /// Orientation-free identity of the face.
    pub fn sorted_key(&self) -> [usize; 4] {
        let mut key = self.0;
        key.sort_unstable();
        key
    }

    /// Returns true if both faces visit the same points in the same cyclic order.
    pub fn same_loop(&self, other: &Face) -> bool {
        (0..4).any(|shift| (0..4).all(|i| self.0[i] == other.0[(i + shift) % 4]))
    }

    /// Returns true if `other` is this face with reversed orientation.
    pub fn opposite_loop(&self, other: &Face) -> bool {
        self.same_loop(&other.reversed())
    }

    /// Returns true if the face lists a point more than once.
    pub fn is_degenerate(&self) -> bool {
        let key = self.sorted_key();
        key.windows(2).any(|w| w[0] == w[1])
    }

    /// Returns the area vector (normal scaled by area) of the face.
    ///
    /// Uses the cross product of the diagonals, exact for planar quads.
    pub fn area_vector(&self, points: &[Point]) -> DVec3 {
        let [a, b, c, d] = self.0.map(|i| points[i]);
        0.5 * (c - a).cross(d - b)
    }

    /// Returns the unit normal, or zero for a collapsed face.
    pub fn normal(&self, points: &[Point]) -> DVec3 {
        self.area_vector(points).normalize_or_zero()
    }

    /// Returns the average of the face points.
    pub fn centre(&self, points: &[Point]) -> Point {
        self.0.iter().map(|&i| points[i]).sum::<DVec3>() / 4.0
    }
}

/// A hexahedral cell referencing 8 point indices in model corner order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HexCell(pub [usize; 8]);

impl HexCell {
    /// Returns the point indices.
    #[inline]
    pub fn points(&self) -> [usize; 8] {
        self.0
    }

    /// Returns the outward faces of the cell.
    pub fn faces(&self) -> [Face; 6] {
        HEX_FACES.map(|slots| Face(slots.map(|s| self.0[s])))
    }

    /// Returns true if the cell lists a point more than once.
    pub fn is_degenerate(&self) -> bool {
        let mut sorted = self.0;
        sorted.sort_unstable();
        sorted.windows(2).any(|w| w[0] == w[1])
    }
}

#[cfg(test)]
mod tests;
