//! Circular arc through three points.

use glam::DVec3;
use std::f64::consts::TAU;

use crate::geometry::Point;

/// A circular arc from a start point, through an intermediate point, to an
/// end point.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcEdge {
    centre: Point,
    radius: f64,
    x_axis: DVec3,
    y_axis: DVec3,
    sweep: f64,
}

impl ArcEdge {
    /// Builds the arc through `start`, `through` and `end`.
    ///
    /// Returns `None` when the points are collinear or coincident.
    pub fn through(start: Point, through: Point, end: Point) -> Option<Self> {
        let a = start - through;
        let b = end - through;
        let axb = a.cross(b);
        let denom = 2.0 * axb.length_squared();
        if !(denom > f64::EPSILON * a.length_squared() * b.length_squared()) {
            return None;
        }

        // Circumcentre of the triangle (start, through, end)
        let centre = through + (a.length_squared() * b - b.length_squared() * a).cross(axb) / denom;
        let radial = start - centre;
        let radius = radial.length();

        // Traversal start -> through -> end is counter-clockwise about this normal
        let normal = (through - start).cross(end - through).normalize_or_zero();
        if normal == DVec3::ZERO || radius == 0.0 {
            return None;
        }
        let x_axis = radial / radius;
        let y_axis = normal.cross(x_axis);

        let to_end = end - centre;
        let mut sweep = to_end.dot(y_axis).atan2(to_end.dot(x_axis));
        if sweep <= 0.0 {
            sweep += TAU;
        }

        Some(Self {
            centre,
            radius,
            x_axis,
            y_axis,
            sweep,
        })
    }

    /// Returns the arc centre.
    pub fn centre(&self) -> Point {
        self.centre
    }

    /// Returns the arc radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the swept angle in radians.
    pub fn sweep(&self) -> f64 {
        self.sweep
    }

    /// Position at parameter `t` in [0, 1], proportional to angle.
    pub fn position_at(&self, t: f64) -> Point {
        let angle = t * self.sweep;
        self.centre + self.radius * (angle.cos() * self.x_axis + angle.sin() * self.y_axis)
    }
}
