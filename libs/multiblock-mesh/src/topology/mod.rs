//! # Block Topology
//!
//! Face adjacency between blocks and the assignment of external block faces
//! to named boundary patches.
//!
//! Every logical block face is keyed by its orientation-free identity (sorted
//! master points). A key held by two blocks is a shared face and both blocks
//! must list it in opposite orientation; a key held by one block is an
//! external face.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::descriptor::BlockDescriptor;
use crate::error::{BlockMeshError, BlockMeshResult};
use crate::geometry::{BlockFace, Face};

/// Boundary condition category of a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PatchKind {
    /// Generic patch
    #[default]
    Patch,
    /// Solid wall
    Wall,
    /// Reduced-dimension front/back face
    Empty,
    /// Planar symmetry
    SymmetryPlane,
    /// General symmetry
    Symmetry,
}

impl PatchKind {
    /// Lower-camel-case name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Patch => "patch",
            Self::Wall => "wall",
            Self::Empty => "empty",
            Self::SymmetryPlane => "symmetryPlane",
            Self::Symmetry => "symmetry",
        }
    }
}

impl std::fmt::Display for PatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named patch claiming block faces given as master point loops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchDeclaration {
    /// Patch name
    pub name: String,
    /// Boundary condition category
    #[serde(default)]
    pub kind: PatchKind,
    /// Block faces as master point loops, any orientation
    #[serde(default)]
    pub faces: Vec<[usize; 4]>,
}

impl PatchDeclaration {
    /// Creates a patch declaration.
    pub fn new(name: impl Into<String>, kind: PatchKind, faces: Vec<[usize; 4]>) -> Self {
        Self {
            name: name.into(),
            kind,
            faces,
        }
    }
}

/// Patch receiving every external face no declaration claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultPatch {
    /// Patch name
    pub name: String,
    /// Boundary condition category
    #[serde(default)]
    pub kind: PatchKind,
}

/// A logical face of one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockFaceRef {
    /// Block index
    pub block: usize,
    /// Logical face
    pub face: BlockFace,
}

/// Two block faces joined into one internal face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedFace {
    /// Face of the lower-numbered block
    pub owner: BlockFaceRef,
    /// Face of the higher-numbered block
    pub neighbour: BlockFaceRef,
}

/// A patch resolved to block faces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockPatch {
    /// Patch name
    pub name: String,
    /// Boundary condition category
    pub kind: PatchKind,
    /// Claimed block faces in declaration order
    pub faces: Vec<BlockFaceRef>,
}

/// Face adjacency and patches of a set of blocks.
#[derive(Debug, Clone, Default)]
pub struct BlockTopology {
    shared: Vec<SharedFace>,
    external: Vec<BlockFaceRef>,
    /// External face by orientation-free master key
    external_keys: HashMap<[usize; 4], BlockFaceRef>,
    neighbours: HashMap<BlockFaceRef, BlockFaceRef>,
    patches: Vec<BlockPatch>,
}

impl BlockTopology {
    /// Matches the faces of all blocks.
    ///
    /// # Errors
    ///
    /// Returns a topology error when two blocks list a shared face with the
    /// same orientation, when more than two blocks claim one face, or when
    /// faces of two blocks share three corners but not the fourth.
    pub fn new(descriptors: &[BlockDescriptor]) -> BlockMeshResult<Self> {
        let mut by_key: HashMap<[usize; 4], Vec<(BlockFaceRef, Face)>> = HashMap::new();
        for (block, descriptor) in descriptors.iter().enumerate() {
            for face in BlockFace::ALL {
                let loop_ = descriptor.face(face);
                by_key
                    .entry(loop_.sorted_key())
                    .or_default()
                    .push((BlockFaceRef { block, face }, loop_));
            }
        }

        check_corner_sharing(&by_key)?;

        let mut topology = Self::default();
        for entries in by_key.into_values() {
            match entries.as_slice() {
                [(single, _)] => topology.external.push(*single),
                [(a, fa), (b, fb)] => {
                    if a.block == b.block {
                        return Err(BlockMeshError::topology(
                            a.block,
                            a.face.index(),
                            format!("block lists face {:?} twice", fa.points()),
                        ));
                    }
                    if !fa.opposite_loop(fb) {
                        return Err(BlockMeshError::topology_pair(
                            a.block,
                            a.face.index(),
                            (b.block, b.face.index()),
                            "shared face has the same orientation in both blocks",
                        ));
                    }
                    let (owner, neighbour) = if a <= b { (*a, *b) } else { (*b, *a) };
                    topology.shared.push(SharedFace { owner, neighbour });
                }
                [(a, fa), (b, _), ..] => {
                    return Err(BlockMeshError::topology_pair(
                        a.block,
                        a.face.index(),
                        (b.block, b.face.index()),
                        format!(
                            "face {:?} is claimed by {} block faces",
                            fa.points(),
                            entries.len()
                        ),
                    ));
                }
                [] => {}
            }
        }

        topology.shared.sort_unstable_by_key(|s| (s.owner, s.neighbour));
        topology.external.sort_unstable();
        for shared in &topology.shared {
            topology.neighbours.insert(shared.owner, shared.neighbour);
            topology.neighbours.insert(shared.neighbour, shared.owner);
        }
        for &face in &topology.external {
            let key = descriptors[face.block].face(face.face).sorted_key();
            topology.external_keys.insert(key, face);
        }

        debug!(
            blocks = descriptors.len(),
            shared = topology.shared.len(),
            external = topology.external.len(),
            "Matched block faces"
        );
        Ok(topology)
    }

    /// Face pairs shared between blocks, sorted by owner.
    pub fn shared_faces(&self) -> &[SharedFace] {
        &self.shared
    }

    /// External block faces, sorted by block then face.
    pub fn external_faces(&self) -> &[BlockFaceRef] {
        &self.external
    }

    /// Returns the face on the other side of `face`, if it is shared.
    pub fn neighbour(&self, face: BlockFaceRef) -> Option<BlockFaceRef> {
        self.neighbours.get(&face).copied()
    }

    /// Returns true if `face` is external.
    pub fn is_external(&self, face: BlockFaceRef) -> bool {
        !self.neighbours.contains_key(&face)
    }

    /// Looks up the external block face with the given master points, in any
    /// orientation.
    pub fn find_external(&self, points: [usize; 4]) -> Option<BlockFaceRef> {
        self.external_keys.get(&Face::new(points).sorted_key()).copied()
    }

    /// Patches resolved by [`Self::assign_patches`].
    pub fn patches(&self) -> &[BlockPatch] {
        &self.patches
    }

    /// Distributes the external faces over the declared patches.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for duplicate patch names, and a topology
    /// error when a declared face is not an external block face, a face is
    /// claimed twice, or an external face is left without a patch and no
    /// default patch is given.
    pub fn assign_patches(
        &mut self,
        descriptors: &[BlockDescriptor],
        declarations: &[PatchDeclaration],
        default_patch: Option<&DefaultPatch>,
    ) -> BlockMeshResult<()> {
        let mut names: HashMap<&str, usize> = HashMap::new();
        for (i, declaration) in declarations.iter().enumerate() {
            if declaration.name.is_empty() {
                return Err(BlockMeshError::invalid_input(format!("patch {i} has no name")));
            }
            if let Some(first) = names.insert(declaration.name.as_str(), i) {
                return Err(BlockMeshError::invalid_input(format!(
                    "patches {first} and {i} are both named '{}'",
                    declaration.name
                )));
            }
        }
        if let Some(default) = default_patch {
            if names.contains_key(default.name.as_str()) {
                return Err(BlockMeshError::invalid_input(format!(
                    "default patch '{}' clashes with a declared patch",
                    default.name
                )));
            }
        }

        let mut claimed: HashMap<BlockFaceRef, &str> = HashMap::new();
        let mut patches = Vec::with_capacity(declarations.len() + 1);
        for declaration in declarations {
            let mut faces = Vec::with_capacity(declaration.faces.len());
            for &points in &declaration.faces {
                let owner = format!("patch '{}'", declaration.name);
                let face = self.resolve_external(descriptors, &owner, points)?;
                if let Some(other) = claimed.insert(face, declaration.name.as_str()) {
                    return Err(BlockMeshError::topology(
                        face.block,
                        face.face.index(),
                        format!(
                            "face {points:?} is claimed by patches '{other}' and '{}'",
                            declaration.name
                        ),
                    ));
                }
                faces.push(face);
            }
            patches.push(BlockPatch {
                name: declaration.name.clone(),
                kind: declaration.kind,
                faces,
            });
        }

        let unassigned: Vec<BlockFaceRef> = self
            .external
            .iter()
            .copied()
            .filter(|f| !claimed.contains_key(f))
            .collect();
        if let Some(&first) = unassigned.first() {
            match default_patch {
                Some(default) => {
                    debug!(
                        patch = %default.name,
                        faces = unassigned.len(),
                        "Collected unassigned faces into default patch"
                    );
                    patches.push(BlockPatch {
                        name: default.name.clone(),
                        kind: default.kind,
                        faces: unassigned,
                    });
                }
                None => {
                    return Err(BlockMeshError::topology(
                        first.block,
                        first.face.index(),
                        format!(
                            "unassigned boundary face {:?}",
                            descriptors[first.block].face(first.face).points()
                        ),
                    ));
                }
            }
        }

        self.patches = patches;
        Ok(())
    }

    /// Resolves a face that `owner` (a patch or projection, for messages)
    /// requires to be external.
    ///
    /// # Errors
    ///
    /// Returns a topology error for an internal face and a configuration
    /// error for a loop that is no block face at all.
    pub(crate) fn resolve_external(
        &self,
        descriptors: &[BlockDescriptor],
        owner: &str,
        points: [usize; 4],
    ) -> BlockMeshResult<BlockFaceRef> {
        if let Some(face) = self.find_external(points) {
            return Ok(face);
        }
        // Report against the block owning the face when it is internal
        let key = Face::new(points).sorted_key();
        let internal = descriptors.iter().enumerate().find_map(|(block, d)| {
            BlockFace::ALL
                .into_iter()
                .find(|&f| d.face(f).sorted_key() == key)
                .map(|face| BlockFaceRef { block, face })
        });
        Err(match internal {
            Some(face) => BlockMeshError::topology(
                face.block,
                face.face.index(),
                format!("{owner} claims internal face {points:?}"),
            ),
            None => BlockMeshError::invalid_input(format!(
                "{owner} claims {points:?}, which is not a block face"
            )),
        })
    }
}

/// Rejects block faces that share exactly three master corners.
///
/// Such faces meet geometrically but cannot be merged, which would leave
/// duplicated points and an internal interface on the boundary.
fn check_corner_sharing(
    by_key: &HashMap<[usize; 4], Vec<(BlockFaceRef, Face)>>,
) -> BlockMeshResult<()> {
    let mut keys: Vec<&[usize; 4]> = by_key.keys().collect();
    keys.sort_unstable();

    let mut by_triple: HashMap<[usize; 3], (&[usize; 4], BlockFaceRef)> = HashMap::new();
    for key in keys {
        let first = by_key[key][0].0;
        for skip in 0..4 {
            let mut triple = [0; 3];
            let rest = key.iter().enumerate().filter(|&(i, _)| i != skip);
            for (slot, (_, &p)) in rest.enumerate() {
                triple[slot] = p;
            }
            if let Some(&(other_key, other)) = by_triple.get(&triple) {
                return Err(BlockMeshError::topology_pair(
                    other.block,
                    other.face.index(),
                    (first.block, first.face.index()),
                    format!("faces {other_key:?} and {key:?} share three corners but not the fourth"),
                ));
            }
            by_triple.insert(triple, (key, first));
        }
    }
    Ok(())
}
