//! # Output
//!
//! Plain-text dumps for inspecting blocks and block topology.

use std::collections::BTreeSet;
use std::io::{self, Write};

use crate::block::Block;
use crate::block_mesh::BlockMesh;
use crate::geometry::BlockFace;

/// Writes the generated points, cells and boundary faces of a block.
///
/// ```text
/// points <n>
/// (x y z)
/// cells <n>
/// (p0 p1 p2 p3 p4 p5 p6 p7)
/// boundary 6
/// <face> <n>
/// (p0 p1 p2 p3)
/// ```
pub fn write_block(block: &Block, sink: &mut impl Write) -> io::Result<()> {
    let points = block.points();
    writeln!(sink, "points {}", points.len())?;
    for p in points {
        writeln!(sink, "({} {} {})", p.x, p.y, p.z)?;
    }

    let cells = block.cells();
    writeln!(sink, "cells {}", cells.len())?;
    for cell in cells {
        let [a, b, c, d, e, f, g, h] = cell.points();
        writeln!(sink, "({a} {b} {c} {d} {e} {f} {g} {h})")?;
    }

    writeln!(sink, "boundary {}", BlockFace::ALL.len())?;
    for face in BlockFace::ALL {
        let quads = block.face_quads(face);
        writeln!(sink, "{face:?} {}", quads.len())?;
        for quad in quads {
            let [a, b, c, d] = quad.points();
            writeln!(sink, "({a} {b} {c} {d})")?;
        }
    }
    Ok(())
}

/// Writes the master points and block edges as a Wavefront OBJ line set.
///
/// Points are written after corner projection and scaling. Every block edge
/// is written once, as a straight line between its master points.
pub fn write_topology_obj(mesh: &BlockMesh, sink: &mut impl Write) -> io::Result<()> {
    let scale = mesh.scale_factor();
    for p in mesh.points() {
        let p = *p * scale;
        writeln!(sink, "v {} {} {}", p.x, p.y, p.z)?;
    }

    let edges: BTreeSet<(usize, usize)> = mesh
        .blocks()
        .iter()
        .flat_map(|b| {
            let d = b.descriptor();
            (0..12).map(move |e| {
                let (s, t) = d.edge(e);
                (s.min(t), s.max(t))
            })
        })
        .collect();
    for (s, t) in edges {
        // OBJ indices start at one
        writeln!(sink, "l {} {}", s + 1, t + 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_mesh::MeshDescription;
    use crate::descriptor::BlockDescriptor;
    use crate::geometry::HEX_CORNERS;
    use crate::topology::{DefaultPatch, PatchKind};
    use config::constants::GlobalConfig;
    use glam::DVec3;
    use std::sync::Arc;

    fn cube() -> Vec<DVec3> {
        HEX_CORNERS
            .iter()
            .map(|c| DVec3::new(c[0] as f64, c[1] as f64, c[2] as f64))
            .collect()
    }

    #[test]
    fn test_write_block() {
        let descriptor = Arc::new(BlockDescriptor::new([0, 1, 2, 3, 4, 5, 6, 7], [1, 1, 1]));
        let block = Block::new(0, descriptor, &cube(), &[]).unwrap();
        let mut out = Vec::new();
        write_block(&block, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "points 8");
        assert_eq!(lines[1], "(0 0 0)");
        assert_eq!(lines[9], "cells 1");
        assert_eq!(lines[10], "(0 1 3 2 4 5 7 6)");
        assert_eq!(lines[11], "boundary 6");
        assert_eq!(lines[12], "XMin 1");
        assert_eq!(lines[13], "(0 4 6 2)");
    }

    #[test]
    fn test_write_topology_obj() {
        let description = MeshDescription {
            points: cube(),
            blocks: vec![BlockDescriptor::new([0, 1, 2, 3, 4, 5, 6, 7], [1, 1, 1])],
            default_patch: Some(DefaultPatch {
                name: "walls".into(),
                kind: PatchKind::Wall,
            }),
            scale: 2.0,
            ..MeshDescription::default()
        };
        let mesh = BlockMesh::new(description, GlobalConfig::default()).unwrap();
        let mut out = Vec::new();
        write_topology_obj(&mesh, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 8);
        assert_eq!(text.lines().filter(|l| l.starts_with("l ")).count(), 12);
        assert!(text.contains("v 2 2 2\n"));
        assert!(text.contains("l 1 2\n"));
    }
}
