//! # Block Mesh
//!
//! Orchestrates the blocks of one mesh: validates the description, matches
//! block faces, computes the merge map, applies surface projection and
//! assembles the global mesh.
//!
//! ## Pipeline
//!
//! ```text
//! MeshDescription → descriptors, topology, patches, merge map  (new)
//!                 → normals, projected corners, edges          (set_projection)
//!                 → parallel block generation → GlobalMesh     (build)
//! ```
//!
//! Topology and merge depend only on the block connectivity, so changing the
//! projection regenerates geometry without re-deriving them.

use config::constants::{validate_scale, GlobalConfig, MERGE_TOLERANCE};
use glam::DVec3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::block::Block;
use crate::descriptor::BlockDescriptor;
use crate::edges::{resolve_edges, CurvedEdge, EdgeContext, EdgeKind, EdgeSpec};
use crate::error::{BlockMeshError, BlockMeshResult};
use crate::geometry::{BlockFace, Face, HexCell, Point};
use crate::merge::MergeMap;
use crate::mesh::{CellZone, GlobalMesh, Patch};
use crate::projection::{average_point_normals, FaceSnap, ProjectionMiss, ProjectionSpec};
use crate::surface::{SurfaceData, TriSurface};
use crate::topology::{BlockFaceRef, BlockTopology, DefaultPatch, PatchDeclaration};

/// Logs at `info` when verbose, at `debug` otherwise.
macro_rules! progress {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!($($arg)+)
        } else {
            tracing::debug!($($arg)+)
        }
    };
}

fn unit_scale() -> f64 {
    1.0
}

/// Complete, already parsed description of a block mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshDescription {
    /// Master points
    pub points: Vec<Point>,
    /// Curved edges; unlisted block edges are straight
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
    /// Blocks
    pub blocks: Vec<BlockDescriptor>,
    /// Boundary patches
    #[serde(default)]
    pub patches: Vec<PatchDeclaration>,
    /// Patch for external faces no declaration claims
    #[serde(default)]
    pub default_patch: Option<DefaultPatch>,
    /// Projection surfaces
    #[serde(default)]
    pub surfaces: Vec<SurfaceData>,
    /// Projected faces and points
    #[serde(default)]
    pub projection: ProjectionSpec,
    /// Factor applied to every output point
    #[serde(default = "unit_scale")]
    pub scale: f64,
}

impl Default for MeshDescription {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            edges: Vec::new(),
            blocks: Vec::new(),
            patches: Vec::new(),
            default_patch: None,
            surfaces: Vec::new(),
            projection: ProjectionSpec::default(),
            scale: unit_scale(),
        }
    }
}

/// A projected block face resolved against the topology.
#[derive(Debug, Clone, Copy)]
struct FaceTarget {
    face: BlockFaceRef,
    surface: usize,
    search_length: f64,
}

/// Geometry derived from projection settings.
struct ProjectedFrame {
    targets: Vec<FaceTarget>,
    normals: Vec<DVec3>,
    points: Vec<Point>,
    misses: Vec<ProjectionMiss>,
    edges: Vec<Arc<CurvedEdge>>,
}

/// The blocks of one mesh with their topology and merge map.
#[derive(Debug)]
pub struct BlockMesh {
    config: GlobalConfig,
    scale: f64,
    /// Master points as declared
    master_points: Vec<Point>,
    /// Master points after corner projection
    points: Vec<Point>,
    edge_specs: Vec<EdgeSpec>,
    edges: Vec<Arc<CurvedEdge>>,
    surfaces: Vec<Arc<TriSurface>>,
    descriptors: Vec<BlockDescriptor>,
    blocks: Vec<Block>,
    topology: BlockTopology,
    merge: MergeMap,
    projection: ProjectionSpec,
    targets: Vec<FaceTarget>,
    normals: Vec<DVec3>,
    corner_misses: Vec<ProjectionMiss>,
}

impl BlockMesh {
    /// Validates a description and prepares its blocks.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid settings, points, edges,
    /// blocks, surfaces or projection references, and a topology error for
    /// inconsistent block faces, unassigned boundary faces, mismatched shared
    /// resolutions or projected internal faces.
    pub fn new(description: MeshDescription, config: GlobalConfig) -> BlockMeshResult<Self> {
        let MeshDescription {
            points,
            edges,
            blocks,
            patches,
            default_patch,
            surfaces,
            projection,
            scale,
        } = description;

        let scale = validate_scale(scale)?;
        if blocks.is_empty() {
            return Err(BlockMeshError::invalid_input("no blocks declared"));
        }
        if let Some(p) = points.iter().position(|p| !p.is_finite()) {
            return Err(BlockMeshError::invalid_input(format!("point {p} is not finite")));
        }
        for (b, descriptor) in blocks.iter().enumerate() {
            descriptor.validate(b, &points)?;
        }
        let surfaces = surfaces
            .into_iter()
            .map(|data| TriSurface::new(data).map(Arc::new))
            .collect::<BlockMeshResult<Vec<_>>>()?;

        let mut topology = BlockTopology::new(&blocks)?;
        topology.assign_patches(&blocks, &patches, default_patch.as_ref())?;
        let merge = MergeMap::new(&blocks, &topology)?;

        let block_list = blocks
            .iter()
            .enumerate()
            .map(|(b, d)| Block::new(b, Arc::new(d.clone()), &points, &[]))
            .collect::<BlockMeshResult<Vec<_>>>()?;

        let mut mesh = Self {
            config,
            scale,
            points: points.clone(),
            master_points: points,
            edge_specs: edges,
            edges: Vec::new(),
            surfaces,
            descriptors: blocks,
            blocks: block_list,
            topology,
            merge,
            projection: ProjectionSpec::default(),
            targets: Vec::new(),
            normals: Vec::new(),
            corner_misses: Vec::new(),
        };
        mesh.set_projection(projection)?;
        mesh.check_unused_edges();

        progress!(
            mesh.config.verbose,
            blocks = mesh.blocks.len(),
            points = mesh.n_points(),
            cells = mesh.n_cells(),
            patches = mesh.n_patches(),
            "Prepared block mesh"
        );
        Ok(mesh)
    }

    /// Replaces the projection, recomputing point normals, projected corners
    /// and projected edges, and discarding all generated block geometry.
    /// Topology and merge map are kept.
    ///
    /// On error the previous projection stays in effect.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unknown points or surfaces and a
    /// topology error for a projected face that is not external.
    pub fn set_projection(&mut self, projection: ProjectionSpec) -> BlockMeshResult<()> {
        let frame = self.project_frame(&projection)?;

        for block in &mut self.blocks {
            block.set_frame(&frame.points, &frame.edges);
            for face in BlockFace::ALL {
                block.set_face_projection(face, None);
            }
        }
        for target in &frame.targets {
            let snap = FaceSnap {
                surface: Arc::clone(&self.surfaces[target.surface]),
                search_length: target.search_length,
            };
            self.blocks[target.face.block].set_face_projection(target.face.face, Some(snap));
        }

        if !frame.misses.is_empty() {
            warn!(
                misses = frame.misses.len(),
                "Projected block corners found no surface hit; kept unprojected positions"
            );
        }
        progress!(
            self.config.verbose,
            faces = frame.targets.len(),
            corners = projection.points.len(),
            "Applied projection"
        );

        self.projection = projection;
        self.targets = frame.targets;
        self.normals = frame.normals;
        self.points = frame.points;
        self.corner_misses = frame.misses;
        self.edges = frame.edges;
        Ok(())
    }

    fn project_frame(&self, projection: &ProjectionSpec) -> BlockMeshResult<ProjectedFrame> {
        projection.validate(self.master_points.len(), self.surfaces.len())?;
        let default_length = projection.search_length.unwrap_or(self.config.search_length);

        let targets = projection
            .faces
            .iter()
            .map(|pf| {
                let face = self
                    .topology
                    .resolve_external(&self.descriptors, "projection", pf.face)?;
                Ok(FaceTarget {
                    face,
                    surface: pf.surface,
                    search_length: pf.search_length.unwrap_or(default_length),
                })
            })
            .collect::<BlockMeshResult<Vec<_>>>()?;

        let normals = self.point_normals(&targets, projection);

        // Corners: explicit point entries first, then projected faces
        let mut requests: HashMap<usize, (usize, f64)> = HashMap::new();
        for target in &targets {
            for p in self.descriptors[target.face.block].face(target.face.face).points() {
                requests
                    .entry(p)
                    .or_insert((target.surface, target.search_length));
            }
        }
        for point in &projection.points {
            let length = point.search_length.unwrap_or(default_length);
            requests.insert(point.point, (point.surface, length));
        }
        for fixed in &projection.fixed_points {
            requests.remove(fixed);
        }

        let mut points = self.master_points.clone();
        let mut misses = Vec::new();
        let mut order: Vec<_> = requests.into_iter().collect();
        order.sort_unstable_by_key(|&(p, _)| p);
        for (p, (surface, length)) in order {
            match self.surfaces[surface].project(points[p], normals[p], length) {
                Some(hit) => points[p] = hit,
                None => misses.push(ProjectionMiss {
                    block: None,
                    point: p,
                    position: points[p],
                }),
            }
        }

        let ctx = EdgeContext {
            points: &points,
            surfaces: &self.surfaces,
            normals: &normals,
            search_length: default_length,
        };
        let mut edges = resolve_edges(&self.edge_specs, &ctx)?;

        // Straight edges of projected faces follow the surface
        for target in &targets {
            let [a, b, c, d] = self.descriptors[target.face.block]
                .face(target.face.face)
                .points();
            for (start, end) in [(a, b), (b, c), (c, d), (d, a)] {
                if edges.iter().any(|e| e.connects(start, end).is_some()) {
                    continue;
                }
                let edge = CurvedEdge::projected(start, end, &ctx, target.surface, target.search_length)?;
                edges.push(Arc::new(edge));
            }
        }

        Ok(ProjectedFrame {
            targets,
            normals,
            points,
            misses,
            edges,
        })
    }

    /// Search directions of projected master points.
    ///
    /// A point on projected faces averages the normals of those faces,
    /// evaluated on the unprojected master geometry. An explicitly projected
    /// point, or an end of a declared projected edge, on no projected face
    /// averages all incident external faces.
    /// Other points get a zero normal.
    pub fn calculate_point_normals(&self) -> Vec<DVec3> {
        self.point_normals(&self.targets, &self.projection)
    }

    fn point_normals(&self, targets: &[FaceTarget], projection: &ProjectionSpec) -> Vec<DVec3> {
        let n = self.master_points.len();
        let projected_faces: Vec<_> = targets
            .iter()
            .map(|t| self.descriptors[t.face.block].face(t.face.face))
            .collect();
        let mut normals = average_point_normals(n, &self.master_points, &projected_faces);

        // Explicit points and declared projected edge ends without a
        // projected face take the normals of their external faces
        let mut fallback: Vec<usize> = projection.points.iter().map(|p| p.point).collect();
        for spec in &self.edge_specs {
            if matches!(spec.kind, EdgeKind::Projected { .. }) {
                fallback.extend([spec.start, spec.end]);
            }
        }
        fallback.retain(|&p| p < n && normals[p] == DVec3::ZERO);

        if !fallback.is_empty() {
            let external: Vec<_> = self
                .topology
                .external_faces()
                .iter()
                .map(|f| self.descriptors[f.block].face(f.face))
                .collect();
            let external_normals = average_point_normals(n, &self.master_points, &external);
            for p in fallback {
                normals[p] = external_normals[p];
            }
        }
        normals
    }

    fn check_unused_edges(&self) {
        for spec in &self.edge_specs {
            let used = self.descriptors.iter().any(|d| {
                (0..12).any(|e| {
                    let (s, t) = d.edge(e);
                    (s, t) == (spec.start, spec.end) || (t, s) == (spec.start, spec.end)
                })
            });
            if !used {
                warn!(
                    start = spec.start,
                    end = spec.end,
                    "Curved edge is not an edge of any block and is ignored"
                );
            }
        }
    }

    /// Generates every block in parallel and assembles the global mesh.
    ///
    /// All fatal conditions are detected by [`Self::new`] and
    /// [`Self::set_projection`], so assembling cannot fail.
    pub fn build(&self) -> GlobalMesh {
        self.blocks.par_iter().for_each(Block::generate);
        progress!(self.config.verbose, blocks = self.blocks.len(), "Generated blocks");

        let points = self.merged_points();
        let mut cells = Vec::with_capacity(self.n_cells());
        let mut zones: Vec<CellZone> = Vec::new();
        for (b, block) in self.blocks.iter().enumerate() {
            let map = self.merge.block_map(b);
            let first = cells.len();
            cells.extend(block.cells().iter().map(|c| HexCell(c.points().map(|l| map[l]))));
            if let Some(name) = &block.descriptor().zone {
                let zone = match zones.iter().position(|z| &z.name == name) {
                    Some(i) => &mut zones[i],
                    None => {
                        zones.push(CellZone {
                            name: name.clone(),
                            cells: Vec::new(),
                        });
                        let last = zones.len() - 1;
                        &mut zones[last]
                    }
                };
                zone.cells.extend(first..cells.len());
            }
        }

        let patches = self
            .topology
            .patches()
            .iter()
            .map(|patch| Patch {
                name: patch.name.clone(),
                kind: patch.kind,
                faces: patch
                    .faces
                    .iter()
                    .flat_map(|f| {
                        let map = self.merge.block_map(f.block);
                        self.blocks[f.block]
                            .face_quads(f.face)
                            .iter()
                            .map(move |q| Face(q.points().map(|l| map[l])))
                    })
                    .collect(),
            })
            .collect();

        // Blocks sharing a projected edge each report its misses
        let missed: HashSet<usize> = self
            .blocks
            .iter()
            .enumerate()
            .flat_map(|(b, block)| {
                block
                    .projection_misses()
                    .iter()
                    .map(move |m| self.merge.global(b, m.point))
            })
            .collect();
        let misses = self.corner_misses.len() + missed.len();
        if misses > 0 {
            warn!(misses, "Mesh contains unprojected points");
        }

        let mut mesh = GlobalMesh::new(points, cells)
            .with_patches(patches)
            .with_cell_zones(zones)
            .with_projection_misses(misses);
        mesh.scale(self.scale);

        progress!(
            self.config.verbose,
            points = mesh.n_points(),
            cells = mesh.n_cells(),
            patches = mesh.n_patches(),
            "Assembled mesh"
        );
        mesh
    }

    /// Global points; the first block to reach a point sets its position.
    fn merged_points(&self) -> Vec<Point> {
        let mut points = vec![DVec3::ZERO; self.merge.n_points()];
        let mut set = vec![false; points.len()];
        let mut disagreements = 0usize;
        let mut worst = 0.0f64;

        for (b, block) in self.blocks.iter().enumerate() {
            let (lo, hi) = block
                .corners()
                .iter()
                .fold((DVec3::INFINITY, DVec3::NEG_INFINITY), |(lo, hi), c| {
                    (lo.min(*c), hi.max(*c))
                });
            let tolerance = (MERGE_TOLERANCE * lo.distance(hi)).max(self.config.tolerance);

            for (&global, &position) in self.merge.block_map(b).iter().zip(block.points()) {
                if set[global] {
                    let distance = points[global].distance(position);
                    if distance > tolerance {
                        disagreements += 1;
                        worst = worst.max(distance);
                        debug!(block = b, global, distance, "Merged point positions differ");
                    }
                } else {
                    points[global] = position;
                    set[global] = true;
                }
            }
        }

        if disagreements > 0 {
            warn!(
                points = disagreements,
                max_distance = worst,
                "Merged block points do not coincide; kept the first block's positions"
            );
        }
        points
    }

    /// Number of global points.
    pub fn n_points(&self) -> usize {
        self.merge.n_points()
    }

    /// Number of cells.
    pub fn n_cells(&self) -> usize {
        self.blocks.iter().map(Block::n_cells).sum()
    }

    /// Number of boundary patches.
    pub fn n_patches(&self) -> usize {
        self.topology.patches().len()
    }

    /// Factor applied to every output point.
    pub fn scale_factor(&self) -> f64 {
        self.scale
    }

    /// Patch names in output order.
    pub fn patch_names(&self) -> Vec<&str> {
        self.topology.patches().iter().map(|p| p.name.as_str()).collect()
    }

    /// Number of blocks assigned to a cell zone.
    pub fn num_zoned_blocks(&self) -> usize {
        self.descriptors.iter().filter(|d| d.zone.is_some()).count()
    }

    /// Returns the block topology.
    pub fn topology(&self) -> &BlockTopology {
        &self.topology
    }

    /// Returns the merge map.
    pub fn merge_map(&self) -> &MergeMap {
        &self.merge
    }

    /// Returns the blocks.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Master points after corner projection, unscaled.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Curved edges in effect, declared ones first.
    pub fn edges(&self) -> &[Arc<CurvedEdge>] {
        &self.edges
    }

    /// Projection surfaces.
    pub fn surfaces(&self) -> &[Arc<TriSurface>] {
        &self.surfaces
    }

    /// Projection in effect.
    pub fn projection(&self) -> &ProjectionSpec {
        &self.projection
    }

    /// Projection normals of the master points from the last projection
    /// update.
    pub fn point_normals_in_use(&self) -> &[DVec3] {
        &self.normals
    }

    /// Block corners that missed their surface.
    pub fn corner_misses(&self) -> &[ProjectionMiss] {
        &self.corner_misses
    }

    /// Discards the generated geometry of every block.
    pub fn clear_geom(&mut self) {
        for block in &mut self.blocks {
            block.clear_geom();
        }
    }
}
