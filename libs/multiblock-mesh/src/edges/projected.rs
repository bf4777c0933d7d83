//! Straight edge snapped onto a surface point by point.

use glam::DVec3;
use std::sync::Arc;
use tracing::debug;

use crate::geometry::Point;
use crate::surface::TriSurface;

/// Edge whose straight-line points are projected onto a surface.
///
/// The search direction blends the end-point normals and drops the component
/// along the edge tangent, so the search never slides along the edge itself.
#[derive(Debug, Clone)]
pub struct ProjectedEdge {
    surface: Arc<TriSurface>,
    start_normal: DVec3,
    end_normal: DVec3,
    search_length: f64,
}

impl ProjectedEdge {
    /// Creates a projected edge onto `surface`.
    pub fn new(
        surface: Arc<TriSurface>,
        start_normal: DVec3,
        end_normal: DVec3,
        search_length: f64,
    ) -> Self {
        Self {
            surface,
            start_normal,
            end_normal,
            search_length,
        }
    }

    /// Returns the target surface.
    pub fn surface(&self) -> &TriSurface {
        &self.surface
    }

    /// Returns the search length.
    pub fn search_length(&self) -> f64 {
        self.search_length
    }

    /// Search direction at parameter `t` of the edge from `start` to `end`.
    pub fn direction_at(&self, start: Point, end: Point, t: f64) -> DVec3 {
        let blended = self.start_normal.lerp(self.end_normal, t);
        let tangent = (end - start).normalize_or_zero();
        let normal = blended - tangent * tangent.dot(blended);
        if normal.length_squared() > f64::EPSILON {
            normal.normalize()
        } else {
            blended.normalize_or_zero()
        }
    }

    /// Projects `straight`, the straight-line point at `t`; the flag is false
    /// on a miss, in which case `straight` is returned unchanged.
    pub fn evaluate(&self, start: Point, end: Point, t: f64, straight: Point) -> (Point, bool) {
        let direction = self.direction_at(start, end, t);
        match self.surface.project(straight, direction, self.search_length) {
            Some(hit) => (hit, true),
            None => {
                debug!(
                    surface = self.surface.name(),
                    t,
                    search_length = self.search_length,
                    "Projected edge point found no surface hit; keeping straight-line position"
                );
                (straight, false)
            }
        }
    }
}
