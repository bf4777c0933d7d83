//! # Curved Edge Tests

use super::*;
use crate::surface::SurfaceData;
use approx::assert_relative_eq;
use std::f64::consts::FRAC_1_SQRT_2;

fn points() -> Vec<Point> {
    vec![DVec3::new(1.0, 0.0, 0.0), DVec3::new(0.0, 1.0, 0.0)]
}

fn ctx<'a>(points: &'a [Point], surfaces: &'a [Arc<TriSurface>], normals: &'a [DVec3]) -> EdgeContext<'a> {
    EdgeContext {
        points,
        surfaces,
        normals,
        search_length: 1.0,
    }
}

fn spec(kind: EdgeKind) -> EdgeSpec {
    EdgeSpec {
        start: 0,
        end: 1,
        kind,
    }
}

#[test]
fn test_line_interpolates_linearly() {
    let p = points();
    let edge = CurvedEdge::line(0, 1, p[0], p[1]);
    assert!(edge.position_at(0.25).abs_diff_eq(DVec3::new(0.75, 0.25, 0.0), 1e-15));
    assert_eq!(edge.kind_name(), "line");
}

#[test]
fn test_arc_quarter_circle() {
    let p = points();
    let edge = CurvedEdge::from_spec(
        &spec(EdgeKind::Arc {
            through: DVec3::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0),
        }),
        &ctx(&p, &[], &[]),
    )
    .unwrap();

    for i in 0..=10 {
        let q = edge.position_at(i as f64 / 10.0);
        assert_relative_eq!(q.length(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(q.z, 0.0, epsilon = 1e-12);
    }
    let mid = edge.position_at(0.5);
    assert!(mid.abs_diff_eq(DVec3::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0), 1e-12));
}

#[test]
fn test_arc_major_sweep() {
    // Through (0,-1,0): the long way round, three quarters of a circle
    let p = points();
    let edge = CurvedEdge::from_spec(
        &spec(EdgeKind::Arc {
            through: DVec3::new(0.0, -1.0, 0.0),
        }),
        &ctx(&p, &[], &[]),
    )
    .unwrap();
    let EdgeCurve::Arc(arc) = edge.curve() else {
        panic!("expected an arc");
    };
    assert_relative_eq!(arc.sweep(), 1.5 * std::f64::consts::PI, epsilon = 1e-12);
    assert!(edge.position_at(1.0 / 3.0).abs_diff_eq(DVec3::new(0.0, -1.0, 0.0), 1e-12));
    assert!(edge.position_at(2.0 / 3.0).abs_diff_eq(DVec3::new(-1.0, 0.0, 0.0), 1e-12));
}

#[test]
fn test_collinear_arc_is_rejected() {
    let p = points();
    let err = CurvedEdge::from_spec(
        &spec(EdgeKind::Arc {
            through: DVec3::new(0.5, 0.5, 0.0),
        }),
        &ctx(&p, &[], &[]),
    )
    .unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_end_points_are_exact() {
    let p = points();
    let kinds = [
        EdgeKind::Arc {
            through: DVec3::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0),
        },
        EdgeKind::Spline {
            points: vec![DVec3::new(0.8, 0.7, 0.1), DVec3::new(0.4, 0.9, 0.0)],
        },
        EdgeKind::PolyLine {
            points: vec![DVec3::new(1.0, 1.0, 0.0)],
        },
    ];
    for kind in kinds {
        let edge = CurvedEdge::from_spec(&spec(kind), &ctx(&p, &[], &[])).unwrap();
        assert_eq!(edge.position_at(0.0), p[0]);
        assert_eq!(edge.position_at(1.0), p[1]);
        assert_eq!(edge.position_at(-0.5), p[0]);
        assert_eq!(edge.position_at(1.5), p[1]);
    }
}

#[test]
fn test_spline_passes_through_knots() {
    let p = points();
    let knot = DVec3::new(0.9, 0.9, 0.3);
    let edge = CurvedEdge::from_spec(
        &spec(EdgeKind::Spline { points: vec![knot] }),
        &ctx(&p, &[], &[]),
    )
    .unwrap();
    assert!(edge.position_at(0.5).abs_diff_eq(knot, 1e-12));
}

#[test]
fn test_spline_is_continuous() {
    let p = points();
    let edge = CurvedEdge::from_spec(
        &spec(EdgeKind::Spline {
            points: vec![DVec3::new(0.9, 0.5, 0.0), DVec3::new(0.5, 0.9, 0.0)],
        }),
        &ctx(&p, &[], &[]),
    )
    .unwrap();
    let knot = 1.0 / 3.0;
    let before = edge.position_at(knot - 1e-9);
    let after = edge.position_at(knot + 1e-9);
    assert!(before.distance(after) < 1e-6);
}

#[test]
fn test_polyline_uses_arc_length() {
    let p = points();
    let edge = CurvedEdge::from_spec(
        &spec(EdgeKind::PolyLine {
            points: vec![DVec3::new(1.0, 1.0, 0.0)],
        }),
        &ctx(&p, &[], &[]),
    )
    .unwrap();
    // Two unit-length legs: half way is the corner
    assert!(edge.position_at(0.5).abs_diff_eq(DVec3::new(1.0, 1.0, 0.0), 1e-12));
    assert!(edge.position_at(0.25).abs_diff_eq(DVec3::new(1.0, 0.5, 0.0), 1e-12));
}

#[test]
fn test_duplicate_edges_are_rejected() {
    let p = points();
    let specs = vec![
        spec(EdgeKind::Arc {
            through: DVec3::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0),
        }),
        EdgeSpec {
            start: 1,
            end: 0,
            kind: EdgeKind::PolyLine { points: vec![] },
        },
    ];
    assert!(resolve_edges(&specs, &ctx(&p, &[], &[])).is_err());
}

#[test]
fn test_unknown_point_is_rejected() {
    let p = points();
    let bad = EdgeSpec {
        start: 0,
        end: 5,
        kind: EdgeKind::Spline { points: vec![] },
    };
    assert!(CurvedEdge::from_spec(&bad, &ctx(&p, &[], &[])).is_err());
}

#[test]
fn test_connects() {
    let p = points();
    let edge = CurvedEdge::line(0, 1, p[0], p[1]);
    assert_eq!(edge.connects(0, 1), Some(false));
    assert_eq!(edge.connects(1, 0), Some(true));
    assert_eq!(edge.connects(0, 2), None);
}

fn dome() -> Arc<TriSurface> {
    // Plane z = 0.5 over the edge
    Arc::new(
        TriSurface::new(SurfaceData {
            name: "lid".into(),
            vertices: vec![
                DVec3::new(-1.0, -1.0, 0.5),
                DVec3::new(2.0, -1.0, 0.5),
                DVec3::new(2.0, 2.0, 0.5),
                DVec3::new(-1.0, 2.0, 0.5),
            ],
            triangles: vec![[0, 1, 2], [0, 2, 3]],
        })
        .unwrap(),
    )
}

#[test]
fn test_projected_edge_snaps_interior_points() {
    let p = points();
    let surfaces = vec![dome()];
    let normals = vec![DVec3::Z, DVec3::Z];
    let edge = CurvedEdge::from_spec(
        &spec(EdgeKind::Projected {
            surface: 0,
            search_length: None,
        }),
        &ctx(&p, &surfaces, &normals),
    )
    .unwrap();

    let (q, hit) = edge.evaluate(0.5);
    assert!(hit);
    assert!(q.abs_diff_eq(DVec3::new(0.5, 0.5, 0.5), 1e-12));
    // End points stay put
    assert_eq!(edge.position_at(0.0), p[0]);
}

#[test]
fn test_projected_edge_miss_falls_back() {
    let p = points();
    let surfaces = vec![dome()];
    let normals = vec![DVec3::Z, DVec3::Z];
    let edge = CurvedEdge::from_spec(
        &spec(EdgeKind::Projected {
            surface: 0,
            search_length: Some(0.1),
        }),
        &ctx(&p, &surfaces, &normals),
    )
    .unwrap();

    let (q, hit) = edge.evaluate(0.5);
    assert!(!hit);
    assert!(q.abs_diff_eq(DVec3::new(0.5, 0.5, 0.0), 1e-15));
}

#[test]
fn test_projected_direction_drops_tangent() {
    let p = points();
    let surfaces = vec![dome()];
    // Normals leaning along the edge tangent
    let tangent = (p[1] - p[0]).normalize();
    let normals = vec![(DVec3::Z + tangent).normalize(), (DVec3::Z + tangent).normalize()];
    let ctx = ctx(&p, &surfaces, &normals);
    let edge = CurvedEdge::projected(0, 1, &ctx, 0, 1.0).unwrap();
    let EdgeCurve::Projected(projected) = edge.curve() else {
        panic!("expected a projected edge");
    };
    let dir = projected.direction_at(p[0], p[1], 0.5);
    assert_relative_eq!(dir.dot(tangent), 0.0, epsilon = 1e-12);
    assert!(dir.abs_diff_eq(DVec3::Z, 1e-12));
}

#[test]
fn test_projected_edge_unknown_surface() {
    let p = points();
    let err = CurvedEdge::from_spec(
        &spec(EdgeKind::Projected {
            surface: 3,
            search_length: None,
        }),
        &ctx(&p, &[], &[]),
    )
    .unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_reversed_straight_positions_match_chord() {
    let p = points();
    let surfaces = vec![dome()];
    let normals = vec![DVec3::Z, DVec3::Z];
    let line = CurvedEdge::line(0, 1, p[0], p[1]);
    let missed = CurvedEdge::projected(0, 1, &ctx(&p, &surfaces, &normals), 0, 0.0).unwrap();

    for lambda in [0.1, 0.3, 0.7, 0.9] {
        assert_eq!(line.evaluate_from(lambda, true).0, chord(p[1], p[0], lambda));
        assert_eq!(line.evaluate_from(lambda, false).0, chord(p[0], p[1], lambda));
        assert_eq!(missed.evaluate_from(lambda, true), (chord(p[1], p[0], lambda), false));
    }
    assert_eq!(line.evaluate_from(0.0, true).0, p[1]);
    assert_eq!(line.evaluate_from(1.0, true).0, p[0]);
}
