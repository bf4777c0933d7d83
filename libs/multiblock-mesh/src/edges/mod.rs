//! # Curved Edges
//!
//! Interpolation curves between two block corner points. Edges not listed by
//! the caller are straight lines.
//!
//! ## Kinds
//!
//! - **Arc**: circle through an intermediate point
//! - **Spline**: Catmull-Rom spline through interior points
//! - **PolyLine**: piecewise linear through interior points
//! - **Projected**: straight line snapped onto a surface
//!
//! Every kind returns the exact end points at `t = 0` and `t = 1`.

mod arc;
mod projected;
mod spline;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{BlockMeshError, BlockMeshResult};
use crate::geometry::{chord, Point};
use crate::surface::TriSurface;

pub use arc::ArcEdge;
pub use projected::ProjectedEdge;
pub use spline::{PolyLineEdge, SplineEdge};

/// Serializable edge declaration between two master points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    /// Start master point
    pub start: usize,
    /// End master point
    pub end: usize,
    /// Curve kind and its parameters
    pub kind: EdgeKind,
}

/// Curve kind of an [`EdgeSpec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Circular arc through `through`.
    Arc {
        /// Intermediate point on the arc
        through: Point,
    },
    /// Catmull-Rom spline through the interior points.
    Spline {
        /// Interior points, start and end excluded
        points: Vec<Point>,
    },
    /// Polyline through the interior points.
    PolyLine {
        /// Interior points, start and end excluded
        points: Vec<Point>,
    },
    /// Straight line projected onto a surface.
    Projected {
        /// Index of the target surface
        surface: usize,
        /// Overrides the default search length
        #[serde(default)]
        search_length: Option<f64>,
    },
}

/// Resolved interpolation curve of an edge.
#[derive(Debug, Clone)]
pub enum EdgeCurve {
    /// Straight line.
    Line,
    /// Circular arc.
    Arc(ArcEdge),
    /// Catmull-Rom spline.
    Spline(SplineEdge),
    /// Polyline.
    PolyLine(PolyLineEdge),
    /// Straight line projected onto a surface.
    Projected(ProjectedEdge),
}

/// Inputs needed to resolve edge declarations.
#[derive(Debug, Clone, Copy)]
pub struct EdgeContext<'a> {
    /// Master points
    pub points: &'a [Point],
    /// Projection surfaces
    pub surfaces: &'a [Arc<TriSurface>],
    /// Projection normal of each master point
    pub normals: &'a [DVec3],
    /// Search length for projected edges without their own
    pub search_length: f64,
}

impl EdgeContext<'_> {
    fn point(&self, index: usize) -> BlockMeshResult<Point> {
        self.points.get(index).copied().ok_or_else(|| {
            BlockMeshError::invalid_input(format!(
                "edge references point {index} but only {} are defined",
                self.points.len()
            ))
        })
    }

    fn normal(&self, index: usize) -> DVec3 {
        self.normals.get(index).copied().unwrap_or(DVec3::ZERO)
    }
}

/// An edge between two master points with its interpolation curve.
#[derive(Debug, Clone)]
pub struct CurvedEdge {
    start: usize,
    end: usize,
    p0: Point,
    p1: Point,
    curve: EdgeCurve,
}

impl CurvedEdge {
    /// Creates a straight edge.
    pub fn line(start: usize, end: usize, p0: Point, p1: Point) -> Self {
        Self {
            start,
            end,
            p0,
            p1,
            curve: EdgeCurve::Line,
        }
    }

    /// Creates an edge projected onto `surface`.
    pub fn projected(
        start: usize,
        end: usize,
        ctx: &EdgeContext<'_>,
        surface: usize,
        search_length: f64,
    ) -> BlockMeshResult<Self> {
        let target = ctx.surfaces.get(surface).cloned().ok_or_else(|| {
            BlockMeshError::invalid_input(format!(
                "edge {start}-{end} references surface {surface} but only {} are defined",
                ctx.surfaces.len()
            ))
        })?;
        Ok(Self {
            start,
            end,
            p0: ctx.point(start)?,
            p1: ctx.point(end)?,
            curve: EdgeCurve::Projected(ProjectedEdge::new(
                target,
                ctx.normal(start),
                ctx.normal(end),
                search_length,
            )),
        })
    }

    /// Resolves an edge declaration against the master points.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unknown points or surfaces, a
    /// zero-length edge, an arc through collinear points, or non-finite
    /// interior points.
    pub fn from_spec(spec: &EdgeSpec, ctx: &EdgeContext<'_>) -> BlockMeshResult<Self> {
        let (start, end) = (spec.start, spec.end);
        let p0 = ctx.point(start)?;
        let p1 = ctx.point(end)?;
        if start == end {
            return Err(BlockMeshError::invalid_input(format!(
                "edge {start}-{end} starts and ends at the same point"
            )));
        }

        let invalid = |what: &str| {
            BlockMeshError::invalid_input(format!("edge {start}-{end}: {what}"))
        };
        let check_finite = |points: &[Point]| {
            if points.iter().all(|p| p.is_finite()) {
                Ok(())
            } else {
                Err(invalid("interior point is not finite"))
            }
        };

        let curve = match &spec.kind {
            EdgeKind::Arc { through } => {
                check_finite(std::slice::from_ref(through))?;
                EdgeCurve::Arc(
                    ArcEdge::through(p0, *through, p1)
                        .ok_or_else(|| invalid("arc points are collinear"))?,
                )
            }
            EdgeKind::Spline { points } => {
                check_finite(points)?;
                EdgeCurve::Spline(SplineEdge::new(p0, points, p1))
            }
            EdgeKind::PolyLine { points } => {
                check_finite(points)?;
                EdgeCurve::PolyLine(
                    PolyLineEdge::new(p0, points, p1)
                        .ok_or_else(|| invalid("polyline has zero length"))?,
                )
            }
            EdgeKind::Projected {
                surface,
                search_length,
            } => {
                let length = search_length.unwrap_or(ctx.search_length);
                return Self::projected(start, end, ctx, *surface, length);
            }
        };

        Ok(Self {
            start,
            end,
            p0,
            p1,
            curve,
        })
    }

    /// Start master point.
    pub fn start(&self) -> usize {
        self.start
    }

    /// End master point.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Returns the curve.
    pub fn curve(&self) -> &EdgeCurve {
        &self.curve
    }

    /// Short name of the curve kind.
    pub fn kind_name(&self) -> &'static str {
        match self.curve {
            EdgeCurve::Line => "line",
            EdgeCurve::Arc(_) => "arc",
            EdgeCurve::Spline(_) => "spline",
            EdgeCurve::PolyLine(_) => "polyLine",
            EdgeCurve::Projected(_) => "projected",
        }
    }

    /// Returns `Some(reversed)` if the edge joins master points `a` and `b`.
    pub fn connects(&self, a: usize, b: usize) -> Option<bool> {
        if self.start == a && self.end == b {
            Some(false)
        } else if self.start == b && self.end == a {
            Some(true)
        } else {
            None
        }
    }

    /// Position at parameter `t`, with a flag that is false when a projected
    /// edge fell back to its straight-line position.
    pub fn evaluate(&self, t: f64) -> (Point, bool) {
        self.evaluate_from(t, false)
    }

    /// Position at fraction `lambda` measured from the end point when
    /// `reversed`, from the start point otherwise.
    ///
    /// Straight-line positions are taken along the chord in the requested
    /// direction, matching a straight block edge exactly.
    pub fn evaluate_from(&self, lambda: f64, reversed: bool) -> (Point, bool) {
        let (a, b) = if reversed {
            (self.p1, self.p0)
        } else {
            (self.p0, self.p1)
        };
        if lambda <= 0.0 {
            return (a, true);
        }
        if lambda >= 1.0 {
            return (b, true);
        }
        let t = if reversed { 1.0 - lambda } else { lambda };
        match &self.curve {
            EdgeCurve::Line => (chord(a, b, lambda), true),
            EdgeCurve::Arc(arc) => (arc.position_at(t), true),
            EdgeCurve::Spline(spline) => (spline.position_at(t), true),
            EdgeCurve::PolyLine(polyline) => (polyline.position_at(t), true),
            EdgeCurve::Projected(projected) => {
                projected.evaluate(self.p0, self.p1, t, chord(a, b, lambda))
            }
        }
    }

    /// Position at parameter `t`, clamped to [0, 1].
    pub fn position_at(&self, t: f64) -> Point {
        self.evaluate(t).0
    }
}

/// Resolves all edge declarations, rejecting two edges on the same point pair.
pub fn resolve_edges(specs: &[EdgeSpec], ctx: &EdgeContext<'_>) -> BlockMeshResult<Vec<Arc<CurvedEdge>>> {
    let mut seen: HashMap<(usize, usize), usize> = HashMap::new();
    let mut edges = Vec::with_capacity(specs.len());
    for (i, spec) in specs.iter().enumerate() {
        let key = (spec.start.min(spec.end), spec.start.max(spec.end));
        if let Some(first) = seen.insert(key, i) {
            return Err(BlockMeshError::invalid_input(format!(
                "edges {first} and {i} both connect points {} and {}",
                key.0, key.1
            )));
        }
        edges.push(Arc::new(CurvedEdge::from_spec(spec, ctx)?));
    }
    Ok(edges)
}

#[cfg(test)]
mod tests;
