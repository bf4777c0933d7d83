//! # Multi-block Mesh
//!
//! Structured hexahedral mesh generation from a set of blocks.
//! Each block is a hexahedron over 8 master points, filled with a graded
//! grid whose boundary edges may be curved; the blocks are merged into one
//! consistently numbered mesh with named boundary patches.
//!
//! ## Architecture
//!
//! ```text
//! MeshDescription → BlockMesh (topology, merge map, projection)
//!                 → Block × n (transfinite interpolation, in parallel)
//!                 → GlobalMesh (points, cells, patches, zones)
//! ```
//!
//! ## Algorithms
//!
//! - **Grading**: geometric expansion along each block edge
//! - **Edges**: arc, Catmull-Rom spline, polyline, surface-projected line
//! - **Interpolation**: Gordon-Hall transfinite blending over the 12 edges
//! - **Merge**: union-find over grid positions of shared faces, edges and corners
//! - **Projection**: bounded line search against indexed triangle surfaces
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::GlobalConfig;
//! use glam::DVec3;
//! use multiblock_mesh::{BlockDescriptor, BlockMesh, MeshDescription};
//! use multiblock_mesh::topology::{DefaultPatch, PatchKind};
//!
//! let points = vec![
//!     DVec3::new(0.0, 0.0, 0.0),
//!     DVec3::new(1.0, 0.0, 0.0),
//!     DVec3::new(1.0, 1.0, 0.0),
//!     DVec3::new(0.0, 1.0, 0.0),
//!     DVec3::new(0.0, 0.0, 1.0),
//!     DVec3::new(1.0, 0.0, 1.0),
//!     DVec3::new(1.0, 1.0, 1.0),
//!     DVec3::new(0.0, 1.0, 1.0),
//! ];
//! let description = MeshDescription {
//!     points,
//!     blocks: vec![BlockDescriptor::new([0, 1, 2, 3, 4, 5, 6, 7], [2, 2, 2])],
//!     default_patch: Some(DefaultPatch { name: "walls".into(), kind: PatchKind::Wall }),
//!     ..MeshDescription::default()
//! };
//!
//! let mesh = BlockMesh::new(description, GlobalConfig::default())?.build();
//! assert_eq!(mesh.n_points(), 27);
//! assert_eq!(mesh.n_cells(), 8);
//! # Ok::<(), multiblock_mesh::BlockMeshError>(())
//! ```

pub mod block;
pub mod block_mesh;
pub mod descriptor;
pub mod edges;
pub mod error;
pub mod geometry;
pub mod grading;
pub mod merge;
pub mod mesh;
pub mod output;
pub mod projection;
pub mod surface;
pub mod topology;

pub use block::Block;
pub use block_mesh::{BlockMesh, MeshDescription};
pub use descriptor::BlockDescriptor;
pub use error::{BlockMeshError, BlockMeshResult};
pub use mesh::GlobalMesh;
pub use output::{write_block, write_topology_obj};
