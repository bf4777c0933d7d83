//! # Merge Map Tests

use super::*;
use crate::block::Block;
use crate::geometry::Point;
use glam::DVec3;
use std::sync::Arc;

fn lattice(nx: usize, ny: usize, nz: usize) -> Vec<Point> {
    let mut points = Vec::new();
    for k in 0..=nz {
        for j in 0..=ny {
            for i in 0..=nx {
                points.push(DVec3::new(i as f64, j as f64, k as f64));
            }
        }
    }
    points
}

/// Master point label in a lattice of `nx` by `ny` blocks.
fn p(nx: usize, ny: usize, i: usize, j: usize, k: usize) -> usize {
    i + j * (nx + 1) + k * (nx + 1) * (ny + 1)
}

fn hex(nx: usize, ny: usize, i: usize, j: usize, k: usize) -> [usize; 8] {
    HEX_CORNERS.map(|c| p(nx, ny, i + c[0], j + c[1], k + c[2]))
}

fn merge(descriptors: &[BlockDescriptor]) -> BlockMeshResult<MergeMap> {
    let topology = BlockTopology::new(descriptors)?;
    MergeMap::new(descriptors, &topology)
}

/// Every global point collects block points at one position only.
fn assert_consistent(descriptors: &[BlockDescriptor], points: &[Point], map: &MergeMap) {
    let mut seen: Vec<Option<Point>> = vec![None; map.n_points()];
    for (b, d) in descriptors.iter().enumerate() {
        let block = Block::new(b, Arc::new(d.clone()), points, &[]).unwrap();
        for (local, &position) in block.points().iter().enumerate() {
            let global = map.global(b, local);
            match seen[global] {
                Some(first) => assert!(
                    first.abs_diff_eq(position, 1e-12),
                    "block {b} point {local}: {position} vs {first}"
                ),
                None => seen[global] = Some(position),
            }
        }
    }
    // No two global points share a position
    let mut positions: Vec<Point> = seen.into_iter().flatten().collect();
    positions.sort_by(|a, b| a.to_array().partial_cmp(&b.to_array()).unwrap());
    assert!(positions.windows(2).all(|w| !w[0].abs_diff_eq(w[1], 1e-9)));
}

#[test]
fn test_single_block_is_identity() {
    let blocks = vec![BlockDescriptor::new(hex(1, 1, 0, 0, 0), [2, 2, 2])];
    let map = merge(&blocks).unwrap();
    assert_eq!(map.n_points(), 27);
    assert_eq!(map.n_merged(), 0);
    assert_eq!(map.block_map(0), (0..27).collect::<Vec<_>>().as_slice());
}

#[test]
fn test_stacked_blocks_merge_shared_face() {
    let points = lattice(1, 1, 2);
    let blocks = vec![
        BlockDescriptor::new(hex(1, 1, 0, 0, 0), [2, 2, 2]),
        BlockDescriptor::new(hex(1, 1, 0, 0, 1), [2, 2, 2]),
    ];
    let map = merge(&blocks).unwrap();
    assert_eq!(map.n_points(), 45);
    assert_eq!(map.n_merged(), 9);
    assert_eq!(map.n_blocks(), 2);
    // Bottom of block 1 is top of block 0
    assert_eq!(map.global(1, blocks[1].vtx_label(1, 1, 0)), map.global(0, blocks[0].vtx_label(1, 1, 2)));
    // First block keeps its own numbering
    assert_eq!(map.block_map(0), (0..27).collect::<Vec<_>>().as_slice());
    assert_consistent(&blocks, &points, &map);
}

#[test]
fn test_rotated_neighbour() {
    // Second block's x axis runs along global y
    let points = lattice(1, 1, 2);
    let blocks = vec![
        BlockDescriptor::new([0, 1, 3, 2, 4, 5, 7, 6], [3, 2, 2]),
        BlockDescriptor::new([5, 7, 6, 4, 9, 11, 10, 8], [2, 3, 2]),
    ];
    let map = merge(&blocks).unwrap();
    assert_eq!(map.n_points(), 36 + 36 - 12);
    assert_consistent(&blocks, &points, &map);
}

#[test]
fn test_face_resolution_mismatch() {
    let blocks = vec![
        BlockDescriptor::new(hex(1, 1, 0, 0, 0), [2, 2, 2]),
        BlockDescriptor::new(hex(1, 1, 0, 0, 1), [2, 3, 2]),
    ];
    let err = merge(&blocks).unwrap_err();
    assert!(err.is_topology());
    assert!(err.to_string().contains("resolution"));
}

#[test]
fn test_rotated_resolution_mismatch() {
    let blocks = vec![
        BlockDescriptor::new([0, 1, 3, 2, 4, 5, 7, 6], [3, 2, 2]),
        BlockDescriptor::new([5, 7, 6, 4, 9, 11, 10, 8], [3, 2, 2]),
    ];
    assert!(merge(&blocks).unwrap_err().is_topology());
}

#[test]
fn test_blocks_sharing_only_an_edge() {
    // Diagonal neighbours in a 2x2 lattice share the vertical edge at (1, 1)
    let points = lattice(2, 2, 1);
    let blocks = vec![
        BlockDescriptor::new(hex(2, 2, 0, 0, 0), [2, 2, 2]),
        BlockDescriptor::new(hex(2, 2, 1, 1, 0), [1, 1, 2]),
    ];
    let map = merge(&blocks).unwrap();
    assert_eq!(map.n_points(), 27 + 12 - 3);
    assert_consistent(&blocks, &points, &map);
}

#[test]
fn test_shared_edge_resolution_mismatch() {
    let blocks = vec![
        BlockDescriptor::new(hex(2, 2, 0, 0, 0), [2, 2, 2]),
        BlockDescriptor::new(hex(2, 2, 1, 1, 0), [1, 1, 3]),
    ];
    let err = merge(&blocks).unwrap_err();
    assert!(err.is_topology());
    assert!(err.to_string().contains("edge"));
}

#[test]
fn test_blocks_sharing_only_a_corner() {
    let points = lattice(2, 2, 2);
    let blocks = vec![
        BlockDescriptor::new(hex(2, 2, 0, 0, 0), [2, 2, 2]),
        BlockDescriptor::new(hex(2, 2, 1, 1, 1), [1, 1, 1]),
    ];
    let map = merge(&blocks).unwrap();
    assert_eq!(map.n_points(), 27 + 8 - 1);
    assert_consistent(&blocks, &points, &map);
}

#[test]
fn test_four_blocks_around_an_edge() {
    let points = lattice(2, 2, 1);
    let blocks: Vec<_> = [(0, 0), (1, 0), (0, 1), (1, 1)]
        .into_iter()
        .map(|(i, j)| BlockDescriptor::new(hex(2, 2, i, j, 0), [2, 2, 1]))
        .collect();
    let map = merge(&blocks).unwrap();
    // A 4x4x1 grid of cells
    assert_eq!(map.n_points(), 5 * 5 * 2);
    assert_consistent(&blocks, &points, &map);
}
