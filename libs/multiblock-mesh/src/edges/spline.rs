//! Interpolating curves through a list of knots: Catmull-Rom splines and
//! polylines.

use crate::geometry::Point;

/// Uniform Catmull-Rom spline through all knots, start and end included.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineEdge {
    knots: Vec<Point>,
}

impl SplineEdge {
    /// Builds the spline through `start`, the interior points and `end`.
    pub fn new(start: Point, interior: &[Point], end: Point) -> Self {
        let mut knots = Vec::with_capacity(interior.len() + 2);
        knots.push(start);
        knots.extend_from_slice(interior);
        knots.push(end);
        Self { knots }
    }

    /// Returns the knots.
    pub fn knots(&self) -> &[Point] {
        &self.knots
    }

    /// Knot `i`, with the end segments extended by reflection.
    fn knot(&self, i: isize) -> Point {
        let n = self.knots.len() as isize;
        if i < 0 {
            2.0 * self.knots[0] - self.knots[1]
        } else if i >= n {
            2.0 * self.knots[(n - 1) as usize] - self.knots[(n - 2) as usize]
        } else {
            self.knots[i as usize]
        }
    }

    /// Position at parameter `t` in [0, 1]; every segment spans an equal
    /// parameter interval.
    pub fn position_at(&self, t: f64) -> Point {
        let segments = self.knots.len() - 1;
        let s = t * segments as f64;
        let segment = (s.floor() as usize).min(segments - 1);
        let u = s - segment as f64;

        let i = segment as isize;
        let p0 = self.knot(i - 1);
        let p1 = self.knot(i);
        let p2 = self.knot(i + 1);
        let p3 = self.knot(i + 2);

        let u2 = u * u;
        let u3 = u2 * u;
        0.5 * (2.0 * p1
            + (p2 - p0) * u
            + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * u2
            + (3.0 * p1 - p0 - 3.0 * p2 + p3) * u3)
    }
}

/// Piecewise linear curve parameterized by arc length.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyLineEdge {
    knots: Vec<Point>,
    /// Cumulative arc length fraction at each knot
    fractions: Vec<f64>,
}

impl PolyLineEdge {
    /// Builds the polyline through `start`, the interior points and `end`.
    ///
    /// Returns `None` when the polyline has zero length.
    pub fn new(start: Point, interior: &[Point], end: Point) -> Option<Self> {
        let mut knots = Vec::with_capacity(interior.len() + 2);
        knots.push(start);
        knots.extend_from_slice(interior);
        knots.push(end);

        let mut fractions = Vec::with_capacity(knots.len());
        fractions.push(0.0);
        let mut total = 0.0;
        for pair in knots.windows(2) {
            total += pair[0].distance(pair[1]);
            fractions.push(total);
        }
        if !(total > 0.0) {
            return None;
        }
        for f in &mut fractions {
            *f /= total;
        }

        Some(Self { knots, fractions })
    }

    /// Position at parameter `t` in [0, 1].
    pub fn position_at(&self, t: f64) -> Point {
        let segment = self
            .fractions
            .windows(2)
            .position(|w| t <= w[1])
            .unwrap_or(self.knots.len() - 2);
        let (f0, f1) = (self.fractions[segment], self.fractions[segment + 1]);
        let u = if f1 > f0 { (t - f0) / (f1 - f0) } else { 0.0 };
        self.knots[segment].lerp(self.knots[segment + 1], u)
    }
}
