//! # Block
//!
//! Demand-driven generator for the points, cells and boundary faces that fill
//! one block.
//!
//! ## Point Positions
//!
//! Points come from Gordon-Hall transfinite interpolation over the 12 block
//! edges: the trilinear blend of the 8 corners plus, for every edge, the
//! deviation of the (possibly curved, possibly graded) edge from its straight
//! chord, weighted bilinearly across the other two directions. Corners and
//! edge curves are reproduced exactly on the boundary of the block.
//!
//! ## Caching
//!
//! Points, cells and boundary faces are generated on first access and kept
//! until [`Block::clear_geom`]. Generation is deterministic, so regenerating
//! yields bit-identical results.

use glam::DVec3;
use std::sync::{Arc, OnceLock};

use crate::descriptor::BlockDescriptor;
use crate::edges::CurvedEdge;
use crate::error::BlockMeshResult;
use crate::geometry::{chord, edge_axis, BlockFace, Face, HexCell, Point, HEX_CORNERS, HEX_EDGES};
use crate::grading::edge_fractions;
use crate::projection::{FaceSnap, ProjectionMiss};

/// A curved edge seen from one block.
#[derive(Debug, Clone)]
struct EdgeRef {
    edge: Arc<CurvedEdge>,
    /// The edge runs against the block's parametric direction
    reversed: bool,
}

/// Generated points of a block and the projections that missed.
#[derive(Debug, Clone, PartialEq)]
struct GeneratedPoints {
    points: Vec<Point>,
    misses: Vec<ProjectionMiss>,
}

/// One block of the mesh.
#[derive(Debug)]
pub struct Block {
    index: usize,
    descriptor: Arc<BlockDescriptor>,
    corners: [Point; 8],
    edges: [Option<EdgeRef>; 12],
    fractions: [Vec<f64>; 12],
    projection: [Option<FaceSnap>; 6],
    points: OnceLock<GeneratedPoints>,
    cells: OnceLock<Vec<HexCell>>,
    boundary: OnceLock<[Vec<Face>; 6]>,
}

impl Block {
    /// Creates block `index` from its descriptor, the master points and the
    /// curved edges.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid cell counts, corners or
    /// grading.
    pub fn new(
        index: usize,
        descriptor: Arc<BlockDescriptor>,
        points: &[Point],
        edges: &[Arc<CurvedEdge>],
    ) -> BlockMeshResult<Self> {
        descriptor.validate(index, points)?;

        let ratios = descriptor.grading.edge_ratios();
        let mut fractions: [Vec<f64>; 12] = Default::default();
        for (e, lambda) in fractions.iter_mut().enumerate() {
            *lambda = edge_fractions(index, descriptor.cells[edge_axis(e)], ratios[e])?;
        }

        let mut block = Self {
            index,
            corners: descriptor.corner_points(points),
            descriptor,
            edges: Default::default(),
            fractions,
            projection: Default::default(),
            points: OnceLock::new(),
            cells: OnceLock::new(),
            boundary: OnceLock::new(),
        };
        block.attach_edges(edges);
        Ok(block)
    }

    fn attach_edges(&mut self, edges: &[Arc<CurvedEdge>]) {
        for (e, slot) in self.edges.iter_mut().enumerate() {
            let (start, end) = self.descriptor.edge(e);
            *slot = edges.iter().find_map(|edge| {
                edge.connects(start, end).map(|reversed| EdgeRef {
                    edge: Arc::clone(edge),
                    reversed,
                })
            });
        }
    }

    /// Replaces corner positions and curved edges, discarding generated
    /// geometry.
    pub fn set_frame(&mut self, points: &[Point], edges: &[Arc<CurvedEdge>]) {
        self.corners = self.descriptor.corner_points(points);
        self.attach_edges(edges);
        self.clear_geom();
    }

    /// Sets or removes the projection of a logical face, discarding generated
    /// geometry.
    pub fn set_face_projection(&mut self, face: BlockFace, snap: Option<FaceSnap>) {
        self.projection[face.index()] = snap;
        self.clear_geom();
    }

    /// Returns the projection of a logical face.
    pub fn face_projection(&self, face: BlockFace) -> Option<&FaceSnap> {
        self.projection[face.index()].as_ref()
    }

    /// Returns true if any face of the block is projected.
    pub fn has_projection(&self) -> bool {
        self.projection.iter().any(Option::is_some)
    }

    /// Block index within the mesh.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the block definition.
    pub fn descriptor(&self) -> &BlockDescriptor {
        &self.descriptor
    }

    /// Corner positions in hexahedron order.
    pub fn corners(&self) -> &[Point; 8] {
        &self.corners
    }

    /// Curved edge attached to hexahedron edge `edge`, if any.
    pub fn curved_edge(&self, edge: usize) -> Option<&CurvedEdge> {
        self.edges[edge].as_ref().map(|r| r.edge.as_ref())
    }

    /// Graded fractions along hexahedron edge `edge`.
    pub fn edge_fractions(&self, edge: usize) -> &[f64] {
        &self.fractions[edge]
    }

    /// Cell counts along x, y and z.
    pub fn cell_counts(&self) -> [usize; 3] {
        self.descriptor.cells
    }

    /// Number of points of the block grid.
    pub fn n_points(&self) -> usize {
        self.descriptor.n_points()
    }

    /// Number of cells of the block grid.
    pub fn n_cells(&self) -> usize {
        self.descriptor.n_cells()
    }

    /// Local label of the grid point (i, j, k); i varies fastest.
    #[inline]
    pub fn vtx_label(&self, i: usize, j: usize, k: usize) -> usize {
        self.descriptor.vtx_label(i, j, k)
    }

    /// Point on hexahedron edge `edge` at division `division`, with a flag
    /// that is false when a projection missed.
    fn edge_point(&self, edge: usize, division: usize) -> (Point, bool) {
        let lambda = self.fractions[edge][division];
        match &self.edges[edge] {
            Some(EdgeRef { edge, reversed }) => edge.evaluate_from(lambda, *reversed),
            None => {
                let [s, t] = HEX_EDGES[edge];
                (chord(self.corners[s], self.corners[t], lambda), true)
            }
        }
    }

    /// Grid label of division `division` along hexahedron edge `edge`.
    fn edge_label(&self, edge: usize, division: usize) -> usize {
        let counts = self.cell_counts();
        let start = HEX_CORNERS[HEX_EDGES[edge][0]];
        let axis = edge_axis(edge);
        let ijk: [usize; 3] =
            std::array::from_fn(|a| if a == axis { division } else { start[a] * counts[a] });
        self.vtx_label(ijk[0], ijk[1], ijk[2])
    }

    /// Transfinite blend at grid position `ijk`, reading edge points from
    /// `edge_point(edge, division)`.
    fn blend(&self, ijk: [usize; 3], edge_point: impl Fn(usize, usize) -> Point) -> Point {
        let lambda = |e: usize| self.fractions[e][ijk[edge_axis(e)]];

        // Mean fraction per axis, then the bilinear mix of the four parallel
        // edges' fractions at those means
        let mut mean = [0.0; 3];
        for e in 0..12 {
            mean[edge_axis(e)] += 0.25 * lambda(e);
        }
        let mut param = [0.0; 3];
        for e in 0..12 {
            param[edge_axis(e)] += edge_weight(e, mean) * lambda(e);
        }

        let mut p = DVec3::ZERO;
        for (slot, c) in HEX_CORNERS.iter().enumerate() {
            let w: f64 = (0..3)
                .map(|a| if c[a] == 1 { param[a] } else { 1.0 - param[a] })
                .product();
            p += w * self.corners[slot];
        }

        for e in 0..12 {
            let w = edge_weight(e, param);
            if w == 0.0 {
                continue;
            }
            let [s, t] = HEX_EDGES[e];
            let straight = chord(self.corners[s], self.corners[t], param[edge_axis(e)]);
            p += w * (edge_point(e, ijk[edge_axis(e)]) - straight);
        }
        p
    }

    /// Unprojected position of grid point (i, j, k).
    pub fn vertex_at(&self, i: usize, j: usize, k: usize) -> Point {
        self.blend([i, j, k], |e, d| self.edge_point(e, d).0)
    }

    /// Returns the points filling the block, generating them on first access.
    pub fn points(&self) -> &[Point] {
        &self.points.get_or_init(|| self.generate_points()).points
    }

    /// Projections that missed while generating the points.
    pub fn projection_misses(&self) -> &[ProjectionMiss] {
        &self.points.get_or_init(|| self.generate_points()).misses
    }

    /// Returns the cells filling the block, generating them on first access.
    pub fn cells(&self) -> &[HexCell] {
        self.cells.get_or_init(|| self.generate_cells())
    }

    /// Returns the boundary faces of the six logical faces, in [`BlockFace`]
    /// order, generating them on first access.
    pub fn boundary_faces(&self) -> &[Vec<Face>; 6] {
        self.boundary.get_or_init(|| self.generate_boundary())
    }

    /// Boundary faces of one logical face.
    pub fn face_quads(&self, face: BlockFace) -> &[Face] {
        &self.boundary_faces()[face.index()]
    }

    /// Generates points, cells and boundary faces.
    pub fn generate(&self) {
        self.points();
        self.cells();
        self.boundary_faces();
    }

    /// Returns true once the points have been generated.
    pub fn is_generated(&self) -> bool {
        self.points.get().is_some()
    }

    /// Returns true once points, cells and boundary faces are all generated.
    pub fn is_fully_generated(&self) -> bool {
        self.is_generated() && self.cells.get().is_some() && self.boundary.get().is_some()
    }

    /// Discards generated points, cells and boundary faces.
    pub fn clear_geom(&mut self) {
        self.points.take();
        self.cells.take();
        self.boundary.take();
    }

    fn generate_points(&self) -> GeneratedPoints {
        let [nx, ny, nz] = self.cell_counts();
        let mut misses = Vec::new();

        // Edge points are evaluated once; projected edges are expensive
        let edge_grid: [Vec<Point>; 12] = std::array::from_fn(|e| {
            (0..self.fractions[e].len())
                .map(|d| {
                    let (p, hit) = self.edge_point(e, d);
                    if !hit {
                        misses.push(ProjectionMiss {
                            block: Some(self.index),
                            point: self.edge_label(e, d),
                            position: p,
                        });
                    }
                    p
                })
                .collect()
        });

        let mut points = Vec::with_capacity(self.n_points());
        for k in 0..=nz {
            for j in 0..=ny {
                for i in 0..=nx {
                    points.push(self.blend([i, j, k], |e, d| edge_grid[e][d]));
                }
            }
        }

        if self.has_projection() {
            self.project_faces(&mut points, &mut misses);
        }

        if !misses.is_empty() {
            tracing::warn!(
                block = self.index,
                misses = misses.len(),
                "Projected points found no surface hit; kept unprojected positions"
            );
        }

        GeneratedPoints { points, misses }
    }

    /// Moves the face-interior points of projected faces onto their surfaces
    /// along the averaged normal of the adjacent unprojected quads.
    fn project_faces(&self, points: &mut [Point], misses: &mut Vec<ProjectionMiss>) {
        let counts = self.cell_counts();
        let boundary = self.generate_boundary();

        let mut normals = vec![DVec3::ZERO; points.len()];
        for face in BlockFace::ALL {
            if self.projection[face.index()].is_none() {
                continue;
            }
            for quad in &boundary[face.index()] {
                let n = quad.normal(points);
                for p in quad.points() {
                    normals[p] += n;
                }
            }
        }

        let mut moved = Vec::new();
        for face in BlockFace::ALL {
            let Some(snap) = &self.projection[face.index()] else {
                continue;
            };
            let axis = face.axis();
            let fixed = if face.is_max() { counts[axis] } else { 0 };
            let (a, b) = other_axes(axis);

            for ib in 1..counts[b] {
                for ia in 1..counts[a] {
                    let mut ijk = [0; 3];
                    ijk[axis] = fixed;
                    ijk[a] = ia;
                    ijk[b] = ib;
                    let label = self.vtx_label(ijk[0], ijk[1], ijk[2]);
                    let p = points[label];
                    match snap.surface.project(p, normals[label], snap.search_length) {
                        Some(hit) => moved.push((label, hit)),
                        None => misses.push(ProjectionMiss {
                            block: Some(self.index),
                            point: label,
                            position: p,
                        }),
                    }
                }
            }
        }

        for (label, hit) in moved {
            points[label] = hit;
        }
    }

    fn generate_cells(&self) -> Vec<HexCell> {
        let [nx, ny, nz] = self.cell_counts();
        let mut cells = Vec::with_capacity(self.n_cells());
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    cells.push(HexCell(HEX_CORNERS.map(|[di, dj, dk]| {
                        self.vtx_label(i + di, j + dj, k + dk)
                    })));
                }
            }
        }
        cells
    }

    fn generate_boundary(&self) -> [Vec<Face>; 6] {
        let counts = self.cell_counts();
        BlockFace::ALL.map(|face| {
            let axis = face.axis();
            let fixed = if face.is_max() { counts[axis] } else { 0 };
            let (a, b) = other_axes(axis);

            // Parametric offsets of the face corners, taken from the model face
            let offsets = face.corners().map(|slot| HEX_CORNERS[slot]);

            let mut quads = Vec::with_capacity(counts[a] * counts[b]);
            for ib in 0..counts[b] {
                for ia in 0..counts[a] {
                    quads.push(Face::new(offsets.map(|off| {
                        let mut ijk = [0; 3];
                        ijk[axis] = fixed;
                        ijk[a] = ia + off[a];
                        ijk[b] = ib + off[b];
                        self.vtx_label(ijk[0], ijk[1], ijk[2])
                    })));
                }
            }
            quads
        })
    }
}

/// The two axes other than `axis`, in increasing order.
#[inline]
fn other_axes(axis: usize) -> (usize, usize) {
    match axis {
        0 => (1, 2),
        1 => (0, 2),
        _ => (0, 1),
    }
}

/// Bilinear weight of edge `edge` across the two axes it does not run along.
fn edge_weight(edge: usize, param: [f64; 3]) -> f64 {
    let start = HEX_CORNERS[HEX_EDGES[edge][0]];
    let axis = edge_axis(edge);
    (0..3)
        .filter(|&a| a != axis)
        .map(|a| if start[a] == 1 { param[a] } else { 1.0 - param[a] })
        .product()
}
