//! # Spatial Index for Surface Triangle Queries
//!
//! Uses spatial hashing for O(1) average-case triangle lookups so that
//! projection only tests triangles near the search segment.
//!
//! ## Example
//!
//! ```rust,ignore
//! let index = SpatialIndex::build(&vertices, &triangles);
//! let candidates = index.query_box(min, max);
//! ```

use glam::DVec3;
use std::collections::HashMap;

/// Cell size multiplier for spatial hashing.
/// Larger values = fewer cells but more triangles per cell.
const CELL_SIZE_FACTOR: f64 = 2.0;

/// Minimum cell size to avoid too many cells.
const MIN_CELL_SIZE: f64 = 1.0e-6;

/// Upper bound on cells visited by a single box query.
const MAX_QUERY_CELLS: i64 = 1 << 21;

/// 3D cell coordinate for spatial hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CellCoord {
    x: i64,
    y: i64,
    z: i64,
}

impl CellCoord {
    /// Creates a cell coordinate from 3D position.
    fn from_position(pos: DVec3, cell_size: f64) -> Self {
        Self {
            x: (pos.x / cell_size).floor() as i64,
            y: (pos.y / cell_size).floor() as i64,
            z: (pos.z / cell_size).floor() as i64,
        }
    }
}

/// Spatial index for fast triangle queries.
///
/// Uses a hash grid to map 3D space to triangle lists.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    /// Hash grid: cell -> triangle indices
    grid: HashMap<CellCoord, Vec<usize>>,
    /// Cell size for hashing
    cell_size: f64,
    /// Surface bounding box min
    bounds_min: DVec3,
    /// Surface bounding box max
    bounds_max: DVec3,
    /// Total triangle count
    triangle_count: usize,
}

impl SpatialIndex {
    /// Creates a spatial index over triangles given by vertex indices.
    ///
    /// Automatically determines the cell size from the surface extent and
    /// triangle count. Triangle indices must already be validated.
    pub fn build(vertices: &[DVec3], triangles: &[[u32; 3]]) -> Self {
        let (bounds_min, bounds_max) = bounding_box(vertices);
        let triangle_count = triangles.len();

        let extent = bounds_max - bounds_min;
        let avg_extent = (extent.x + extent.y + extent.z) / 3.0;
        let cell_size = (avg_extent / (triangle_count.max(1) as f64).cbrt() * CELL_SIZE_FACTOR)
            .max(MIN_CELL_SIZE);

        let mut grid: HashMap<CellCoord, Vec<usize>> = HashMap::new();

        for (i, tri) in triangles.iter().enumerate() {
            let [v0, v1, v2] = tri.map(|v| vertices[v as usize]);

            let cell_min = CellCoord::from_position(v0.min(v1).min(v2), cell_size);
            let cell_max = CellCoord::from_position(v0.max(v1).max(v2), cell_size);

            for cx in cell_min.x..=cell_max.x {
                for cy in cell_min.y..=cell_max.y {
                    for cz in cell_min.z..=cell_max.z {
                        let cell = CellCoord { x: cx, y: cy, z: cz };
                        grid.entry(cell).or_default().push(i);
                    }
                }
            }
        }

        Self {
            grid,
            cell_size,
            bounds_min,
            bounds_max,
            triangle_count,
        }
    }

    /// Queries triangles that may intersect an axis-aligned box.
    ///
    /// The box is clipped to the surface bounds first, so queries far from the
    /// surface return quickly. Triangle indices are returned in ascending
    /// order.
    pub fn query_box(&self, min: DVec3, max: DVec3) -> Vec<usize> {
        let lo = min.max(self.bounds_min);
        let hi = max.min(self.bounds_max);
        if lo.x > hi.x || lo.y > hi.y || lo.z > hi.z {
            return Vec::new();
        }

        let cell_min = CellCoord::from_position(lo, self.cell_size);
        let cell_max = CellCoord::from_position(hi, self.cell_size);
        let visited = (cell_max.x - cell_min.x + 1)
            * (cell_max.y - cell_min.y + 1)
            * (cell_max.z - cell_min.z + 1);

        let mut seen = vec![false; self.triangle_count];
        if visited > MAX_QUERY_CELLS {
            // Cheaper to walk the occupied cells than the box
            for (cell, tris) in &self.grid {
                let inside = (cell_min.x..=cell_max.x).contains(&cell.x)
                    && (cell_min.y..=cell_max.y).contains(&cell.y)
                    && (cell_min.z..=cell_max.z).contains(&cell.z);
                if inside {
                    for &tri_idx in tris {
                        seen[tri_idx] = true;
                    }
                }
            }
        } else {
            for cx in cell_min.x..=cell_max.x {
                for cy in cell_min.y..=cell_max.y {
                    for cz in cell_min.z..=cell_max.z {
                        let cell = CellCoord { x: cx, y: cy, z: cz };
                        if let Some(tris) = self.grid.get(&cell) {
                            for &tri_idx in tris {
                                seen[tri_idx] = true;
                            }
                        }
                    }
                }
            }
        }

        seen.iter()
            .enumerate()
            .filter_map(|(i, &hit)| hit.then_some(i))
            .collect()
    }

    /// Queries triangles that may intersect the segment from `a` to `b`.
    pub fn query_segment(&self, a: DVec3, b: DVec3) -> Vec<usize> {
        self.query_box(a.min(b), a.max(b))
    }

    /// Returns the number of cells in the index.
    pub fn cell_count(&self) -> usize {
        self.grid.len()
    }

    /// Returns the cell size used for hashing.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Returns the indexed bounding box.
    pub fn bounds(&self) -> (DVec3, DVec3) {
        (self.bounds_min, self.bounds_max)
    }
}

/// Returns the (min, max) corners of a point set, or zeros when empty.
pub(crate) fn bounding_box(points: &[DVec3]) -> (DVec3, DVec3) {
    let Some(&first) = points.first() else {
        return (DVec3::ZERO, DVec3::ZERO);
    };
    points[1..]
        .iter()
        .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> (Vec<DVec3>, Vec<[u32; 3]>) {
        let vertices = vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(0.0, 0.0, 1.0),
            DVec3::new(1.0, 0.0, 1.0),
            DVec3::new(1.0, 1.0, 1.0),
            DVec3::new(0.0, 1.0, 1.0),
        ];
        let triangles = vec![[0, 1, 2], [0, 2, 3], [4, 6, 5], [4, 7, 6]];
        (vertices, triangles)
    }

    #[test]
    fn test_spatial_index_creation() {
        let (v, t) = square();
        let index = SpatialIndex::build(&v, &t);
        assert!(index.cell_count() > 0);
        assert!(index.cell_size() > 0.0);
    }

    #[test]
    fn test_query_box_all() {
        let (v, t) = square();
        let index = SpatialIndex::build(&v, &t);
        assert_eq!(index.query_box(DVec3::ZERO, DVec3::ONE), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_query_box_partial() {
        let (v, t) = square();
        let index = SpatialIndex::build(&v, &t);
        let candidates = index.query_box(DVec3::splat(-0.1), DVec3::new(1.1, 1.1, 0.2));
        assert!(candidates.contains(&0));
        assert!(candidates.contains(&1));
    }

    #[test]
    fn test_query_segment_miss() {
        let (v, t) = square();
        let index = SpatialIndex::build(&v, &t);
        let candidates = index.query_segment(DVec3::new(100.0, 100.0, -1.0), DVec3::new(100.0, 100.0, 1.0));
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_empty_index() {
        let index = SpatialIndex::build(&[], &[]);
        assert!(index.query_box(DVec3::splat(-1.0), DVec3::ONE).is_empty());
    }
}
