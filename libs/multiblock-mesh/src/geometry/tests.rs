//! # Hexahedron Model Tests

use super::*;

fn unit_corners() -> Vec<Point> {
    HEX_CORNERS
        .iter()
        .map(|c| DVec3::new(c[0] as f64, c[1] as f64, c[2] as f64))
        .collect()
}

#[test]
fn test_faces_point_outward() {
    let points = unit_corners();
    let centre = DVec3::splat(0.5);
    for face in BlockFace::ALL {
        let f = Face::new(face.corners());
        let outward = f.centre(&points) - centre;
        assert!(
            f.normal(&points).dot(outward) > 0.0,
            "face {:?} points inward",
            face
        );
    }
}

#[test]
fn test_face_axis_matches_corners() {
    for face in BlockFace::ALL {
        let value = if face.is_max() { 1 } else { 0 };
        for slot in face.corners() {
            assert_eq!(HEX_CORNERS[slot][face.axis()], value);
        }
    }
}

#[test]
fn test_edges_run_along_their_axis() {
    for (e, [s, t]) in HEX_EDGES.iter().enumerate() {
        let axis = edge_axis(e);
        assert_eq!(HEX_CORNERS[*s][axis], 0);
        assert_eq!(HEX_CORNERS[*t][axis], 1);
        for other in 0..3 {
            if other != axis {
                assert_eq!(HEX_CORNERS[*s][other], HEX_CORNERS[*t][other]);
            }
        }
    }
}

#[test]
fn test_edge_between() {
    assert_eq!(edge_between(0, 1), Some((0, false)));
    assert_eq!(edge_between(2, 3), Some((1, true)));
    assert_eq!(edge_between(3, 7), Some((11, false)));
    assert_eq!(edge_between(0, 6), None);
}

#[test]
fn test_face_loops() {
    let face = Face::new([4, 8, 9, 5]);
    assert!(face.same_loop(&Face::new([9, 5, 4, 8])));
    assert!(!face.same_loop(&face.reversed()));
    assert!(face.opposite_loop(&Face::new([5, 9, 8, 4])));
    assert!(!face.is_degenerate());
    assert!(Face::new([1, 2, 2, 3]).is_degenerate());
}

#[test]
fn test_cell_faces_and_degeneracy() {
    let cell = HexCell([0, 1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(cell.faces()[4], Face([0, 3, 2, 1]));
    assert!(!cell.is_degenerate());
    assert!(HexCell([0, 1, 2, 3, 4, 5, 6, 0]).is_degenerate());
}

#[test]
fn test_face_area_vector() {
    let points = unit_corners();
    let bottom = Face::new(BlockFace::ZMin.corners());
    let area = bottom.area_vector(&points);
    assert!(area.abs_diff_eq(DVec3::new(0.0, 0.0, -1.0), 1e-12));
}
