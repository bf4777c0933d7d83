//! # Projection Surfaces
//!
//! Triangulated surfaces that boundary points, edges and faces are snapped to,
//! and the line search that does the snapping.
//!
//! ## Contract
//!
//! [`project`] casts a line through the point along the search direction,
//! both ways, up to the maximum search length, and returns the nearest
//! intersection. Surfaces may be open or locally non-manifold; only the
//! nearest hit within range matters.

mod spatial_index;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::{BlockMeshError, BlockMeshResult};
use crate::geometry::Point;

pub use spatial_index::SpatialIndex;

/// Relative slack on barycentric coordinates so hits on shared triangle
/// edges are not lost.
const BARYCENTRIC_SLACK: f64 = 1.0e-10;

/// Serializable surface description supplied by the caller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfaceData {
    /// Surface name, used in diagnostics
    pub name: String,
    /// Vertex positions
    pub vertices: Vec<Point>,
    /// Triangles as vertex index triples
    pub triangles: Vec<[u32; 3]>,
}

/// An indexed, immutable triangulated surface.
#[derive(Debug, Clone)]
pub struct TriSurface {
    name: String,
    vertices: Vec<Point>,
    triangles: Vec<[u32; 3]>,
    index: SpatialIndex,
}

impl TriSurface {
    /// Validates surface data and builds its spatial index.
    ///
    /// # Errors
    ///
    /// Returns a surface error when a triangle references a missing vertex
    /// or a vertex is not finite.
    pub fn new(data: SurfaceData) -> BlockMeshResult<Self> {
        let SurfaceData {
            name,
            vertices,
            triangles,
        } = data;

        if let Some(v) = vertices.iter().position(|v| !v.is_finite()) {
            return Err(BlockMeshError::surface(&name, format!("vertex {v} is not finite")));
        }
        let vertex_count = vertices.len();
        if let Some(t) = triangles
            .iter()
            .position(|tri| tri.iter().any(|&v| v as usize >= vertex_count))
        {
            return Err(BlockMeshError::surface(
                &name,
                format!("triangle {t} references a vertex out of range (have {vertex_count})"),
            ));
        }

        let index = SpatialIndex::build(&vertices, &triangles);
        Ok(Self {
            name,
            vertices,
            triangles,
            index,
        })
    }

    /// Returns the surface name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the vertex positions.
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Returns the triangles.
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Returns the number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Projects a point onto this surface; see [`project`].
    pub fn project(&self, point: Point, direction: DVec3, max_length: f64) -> Option<Point> {
        project(point, direction, self, max_length)
    }

    /// Signed line parameter of the intersection with triangle `t`, if any.
    fn intersect(&self, t: usize, origin: Point, direction: DVec3) -> Option<f64> {
        let [a, b, c] = self.triangles[t].map(|v| self.vertices[v as usize]);
        let e1 = b - a;
        let e2 = c - a;
        let p = direction.cross(e2);
        let det = e1.dot(p);
        if det.abs() <= f64::EPSILON * e1.length() * e2.length() {
            return None;
        }
        let inv = 1.0 / det;
        let s = origin - a;
        let u = s.dot(p) * inv;
        if !(-BARYCENTRIC_SLACK..=1.0 + BARYCENTRIC_SLACK).contains(&u) {
            return None;
        }
        let q = s.cross(e1);
        let v = direction.dot(q) * inv;
        if v < -BARYCENTRIC_SLACK || u + v > 1.0 + BARYCENTRIC_SLACK {
            return None;
        }
        Some(e2.dot(q) * inv)
    }
}

/// Returns the nearest point of `surface` on the line through `point` along
/// `direction`, within `max_length` of `point` in either sense.
///
/// Returns `None` when nothing is hit within range, when `max_length` is not
/// positive, or when `direction` is zero.
///
/// # Example
///
/// ```rust
/// use glam::DVec3;
/// use multiblock_mesh::surface::{project, SurfaceData, TriSurface};
///
/// let plane = TriSurface::new(SurfaceData {
///     name: "plane".into(),
///     vertices: vec![
///         DVec3::new(-1.0, -1.0, 2.0),
///         DVec3::new(1.0, -1.0, 2.0),
///         DVec3::new(1.0, 1.0, 2.0),
///         DVec3::new(-1.0, 1.0, 2.0),
///     ],
///     triangles: vec![[0, 1, 2], [0, 2, 3]],
/// })
/// .unwrap();
///
/// let hit = project(DVec3::new(0.2, 0.1, 1.5), DVec3::Z, &plane, 1.0).unwrap();
/// assert!(hit.abs_diff_eq(DVec3::new(0.2, 0.1, 2.0), 1e-12));
/// assert!(project(DVec3::new(0.2, 0.1, 1.5), DVec3::Z, &plane, 0.25).is_none());
/// ```
pub fn project(point: Point, direction: DVec3, surface: &TriSurface, max_length: f64) -> Option<Point> {
    if !(max_length > 0.0) {
        return None;
    }
    let direction = direction.try_normalize()?;

    let reach = direction * max_length;
    let candidates = surface.index.query_segment(point - reach, point + reach);

    let mut best: Option<f64> = None;
    for t in candidates {
        if let Some(s) = surface.intersect(t, point, direction) {
            if s.abs() <= max_length && best.map_or(true, |b| s.abs() < b.abs()) {
                best = Some(s);
            }
        }
    }

    best.map(|s| point + s * direction)
}
