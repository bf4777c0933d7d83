//! # Merge Map
//!
//! Combinatorial map from (block, local point) to global point.
//!
//! Points are identified purely by grid position: a union-find over all block
//! points joins the points of shared faces, then of shared edges (a master
//! point pair forming an edge of several blocks, including blocks that touch
//! only along that edge), then of shared corners. Global numbers are handed
//! out in block order, local order, on first encounter.
//!
//! The map never looks at coordinates, so it stays valid when geometry is
//! regenerated after a projection change.

use std::collections::HashMap;
use tracing::debug;

use crate::descriptor::BlockDescriptor;
use crate::error::{BlockMeshError, BlockMeshResult};
use crate::geometry::{edge_axis, HEX_CORNERS, HEX_EDGES};
use crate::topology::{BlockTopology, SharedFace};

/// Walks a block's grid from one corner along one or two edge directions.
#[derive(Debug, Clone, Copy)]
struct GridWalk {
    origin: [usize; 3],
    steps: [(usize, bool); 2],
}

impl GridWalk {
    /// Walk starting at corner slot `from`, stepping towards the slots in
    /// `towards` (each an edge neighbour of `from`).
    fn new(descriptor: &BlockDescriptor, from: usize, towards: [usize; 2]) -> Self {
        let origin = grid_corner(descriptor, from);
        let steps = towards.map(|to| {
            let axis = (0..3)
                .find(|&a| HEX_CORNERS[from][a] != HEX_CORNERS[to][a])
                .unwrap_or(0);
            (axis, HEX_CORNERS[to][axis] > HEX_CORNERS[from][axis])
        });
        Self { origin, steps }
    }

    fn counts(&self, descriptor: &BlockDescriptor) -> [usize; 2] {
        self.steps.map(|(axis, _)| descriptor.cells[axis])
    }

    fn at(&self, s: usize, t: usize) -> [usize; 3] {
        let mut ijk = self.origin;
        for ((axis, up), n) in self.steps.into_iter().zip([s, t]) {
            ijk[axis] = if up { ijk[axis] + n } else { ijk[axis] - n };
        }
        ijk
    }
}

/// Grid position of corner slot `slot`.
fn grid_corner(descriptor: &BlockDescriptor, slot: usize) -> [usize; 3] {
    let c = HEX_CORNERS[slot];
    [0, 1, 2].map(|a| c[a] * descriptor.cells[a])
}

/// Slot of master point `master` among the block corners.
fn corner_slot(descriptor: &BlockDescriptor, master: usize) -> Option<usize> {
    descriptor.corners.iter().position(|&c| c == master)
}

/// Disjoint sets over all block points, rooted at the smallest member.
#[derive(Debug)]
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra < rb {
            self.parent[rb] = ra;
        } else if rb < ra {
            self.parent[ra] = rb;
        }
    }
}

/// Map from block-local point labels to global point labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeMap {
    offsets: Vec<usize>,
    global: Vec<usize>,
    n_points: usize,
}

impl MergeMap {
    /// Computes the map for the given blocks and their face adjacency.
    ///
    /// # Errors
    ///
    /// Returns a topology error when the grid resolutions of a shared face or
    /// shared edge disagree.
    pub fn new(descriptors: &[BlockDescriptor], topology: &BlockTopology) -> BlockMeshResult<Self> {
        let mut offsets = Vec::with_capacity(descriptors.len() + 1);
        let mut total = 0;
        for d in descriptors {
            offsets.push(total);
            total += d.n_points();
        }
        offsets.push(total);

        let node = |block: usize, ijk: [usize; 3]| {
            offsets[block] + descriptors[block].vtx_label(ijk[0], ijk[1], ijk[2])
        };
        let mut sets = UnionFind::new(total);

        for shared in topology.shared_faces() {
            merge_face(descriptors, shared, &mut sets, &node)?;
        }
        merge_edges(descriptors, &mut sets, &node)?;
        merge_corners(descriptors, &mut sets, &node);

        let mut global = vec![usize::MAX; total];
        let mut n_points = 0;
        for n in 0..total {
            let root = sets.find(n);
            if root == n {
                global[n] = n_points;
                n_points += 1;
            } else {
                global[n] = global[root];
            }
        }

        debug!(
            block_points = total,
            global_points = n_points,
            "Computed merge map"
        );
        Ok(Self {
            offsets,
            global,
            n_points,
        })
    }

    /// Global label of local point `local` of block `block`.
    #[inline]
    pub fn global(&self, block: usize, local: usize) -> usize {
        self.global[self.offsets[block] + local]
    }

    /// Global labels of all points of block `block`, in local order.
    pub fn block_map(&self, block: usize) -> &[usize] {
        &self.global[self.offsets[block]..self.offsets[block + 1]]
    }

    /// Number of blocks covered by the map.
    pub fn n_blocks(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Number of global points.
    pub fn n_points(&self) -> usize {
        self.n_points
    }

    /// Number of block points merged into another block's point.
    pub fn n_merged(&self) -> usize {
        self.global.len() - self.n_points
    }
}

fn merge_face(
    descriptors: &[BlockDescriptor],
    shared: &SharedFace,
    sets: &mut UnionFind,
    node: &impl Fn(usize, [usize; 3]) -> usize,
) -> BlockMeshResult<()> {
    let (a, b) = (shared.owner, shared.neighbour);
    let (da, db) = (&descriptors[a.block], &descriptors[b.block]);
    let mismatch = |message: String| {
        BlockMeshError::topology_pair(a.block, a.face.index(), (b.block, b.face.index()), message)
    };

    // Anchor both walks at the same master corner and step towards the same
    // two master neighbours
    let slots = a.face.corners();
    let masters = slots.map(|s| da.corners[s]);
    let slots_b = masters.map(|m| corner_slot(db, m));
    let [Some(b0), Some(b1), _, Some(b3)] = slots_b else {
        return Err(mismatch(format!("face {masters:?} is not a face of both blocks")));
    };

    let walk_a = GridWalk::new(da, slots[0], [slots[1], slots[3]]);
    let walk_b = GridWalk::new(db, b0, [b1, b3]);
    let (na, nb) = (walk_a.counts(da), walk_b.counts(db));
    if na != nb {
        return Err(mismatch(format!(
            "shared face resolution {}x{} does not match {}x{}",
            na[0], na[1], nb[0], nb[1]
        )));
    }

    for t in 0..=na[1] {
        for s in 0..=na[0] {
            sets.union(node(a.block, walk_a.at(s, t)), node(b.block, walk_b.at(s, t)));
        }
    }
    Ok(())
}

fn merge_edges(
    descriptors: &[BlockDescriptor],
    sets: &mut UnionFind,
    node: &impl Fn(usize, [usize; 3]) -> usize,
) -> BlockMeshResult<()> {
    let mut by_pair: HashMap<(usize, usize), Vec<(usize, usize)>> = HashMap::new();
    for (block, d) in descriptors.iter().enumerate() {
        for e in 0..12 {
            let (s, t) = d.edge(e);
            by_pair.entry((s.min(t), s.max(t))).or_default().push((block, e));
        }
    }

    let mut pairs: Vec<_> = by_pair.into_iter().filter(|(_, v)| v.len() > 1).collect();
    pairs.sort_unstable();

    for ((low, high), users) in pairs {
        // Walk every edge from `low` to `high`
        let walk = |block: usize, edge: usize| {
            let d = &descriptors[block];
            let [s, t] = HEX_EDGES[edge];
            let (from, to) = if d.corners[s] == low { (s, t) } else { (t, s) };
            (GridWalk::new(d, from, [to, to]), d.cells[edge_axis(edge)])
        };

        let (first_block, first_edge) = users[0];
        let (first_walk, n) = walk(first_block, first_edge);
        for &(block, edge) in &users[1..] {
            let (other_walk, m) = walk(block, edge);
            if m != n {
                return Err(BlockMeshError::topology_block(
                    block,
                    format!(
                        "edge {low}-{high} has {m} cells but {n} in block {first_block}"
                    ),
                ));
            }
            for s in 0..=n {
                sets.union(
                    node(first_block, first_walk.at(s, 0)),
                    node(block, other_walk.at(s, 0)),
                );
            }
        }
    }
    Ok(())
}

fn merge_corners(
    descriptors: &[BlockDescriptor],
    sets: &mut UnionFind,
    node: &impl Fn(usize, [usize; 3]) -> usize,
) {
    let mut first: HashMap<usize, usize> = HashMap::new();
    for (block, d) in descriptors.iter().enumerate() {
        for (slot, &master) in d.corners.iter().enumerate() {
            let here = node(block, grid_corner(d, slot));
            match first.get(&master) {
                Some(&there) => sets.union(there, here),
                None => {
                    first.insert(master, here);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests;
