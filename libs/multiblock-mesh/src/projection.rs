//! # Projection Settings
//!
//! Declares which block corners and which boundary faces are snapped to which
//! surface, how far to search, and which corners must never move.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{BlockMeshError, BlockMeshResult};
use crate::geometry::{Face, Point};
use crate::surface::TriSurface;

/// A boundary face, given by its four master points, projected onto a surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedFace {
    /// Master point indices of the block face (any orientation)
    pub face: [usize; 4],
    /// Index of the target surface
    pub surface: usize,
    /// Overrides the projection-wide search length
    #[serde(default)]
    pub search_length: Option<f64>,
}

/// A single master point projected onto a surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    /// Master point index
    pub point: usize,
    /// Index of the target surface
    pub surface: usize,
    /// Overrides the projection-wide search length
    #[serde(default)]
    pub search_length: Option<f64>,
}

/// Which points and faces are projected onto which surfaces.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectionSpec {
    /// Projected boundary faces
    #[serde(default)]
    pub faces: Vec<ProjectedFace>,
    /// Individually projected master points
    #[serde(default)]
    pub points: Vec<ProjectedPoint>,
    /// Master points that never move
    #[serde(default)]
    pub fixed_points: Vec<usize>,
    /// Search length for entries without their own; the global configuration
    /// default applies when absent
    #[serde(default)]
    pub search_length: Option<f64>,
}

impl ProjectionSpec {
    /// Returns true when nothing is projected.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty() && self.points.is_empty()
    }

    /// Checks surface and point references and search lengths.
    pub fn validate(&self, n_points: usize, n_surfaces: usize) -> BlockMeshResult<()> {
        let check_length = |length: Option<f64>| match length {
            Some(l) if !(l >= 0.0) || !l.is_finite() => Err(BlockMeshError::invalid_input(
                format!("projection search length must be non-negative: {l}"),
            )),
            _ => Ok(()),
        };
        let check_surface = |surface: usize| {
            if surface < n_surfaces {
                Ok(())
            } else {
                Err(BlockMeshError::invalid_input(format!(
                    "projection references surface {surface} but only {n_surfaces} are defined"
                )))
            }
        };
        let check_point = |point: usize| {
            if point < n_points {
                Ok(())
            } else {
                Err(BlockMeshError::invalid_input(format!(
                    "projection references point {point} but only {n_points} are defined"
                )))
            }
        };

        check_length(self.search_length)?;
        for face in &self.faces {
            check_surface(face.surface)?;
            check_length(face.search_length)?;
            face.face.iter().try_for_each(|&p| check_point(p))?;
            if Face::new(face.face).is_degenerate() {
                return Err(BlockMeshError::invalid_input(format!(
                    "projected face {:?} repeats a point",
                    face.face
                )));
            }
        }
        for point in &self.points {
            check_surface(point.surface)?;
            check_length(point.search_length)?;
            check_point(point.point)?;
        }
        self.fixed_points.iter().try_for_each(|&p| check_point(p))
    }
}

/// Projection target of one logical block face.
#[derive(Debug, Clone)]
pub struct FaceSnap {
    /// Surface the face points are snapped to
    pub surface: Arc<TriSurface>,
    /// Maximum search distance along the point normal
    pub search_length: f64,
}

/// A projected point that found no surface within its search length and kept
/// its unprojected position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionMiss {
    /// Block whose point missed, `None` for block corners
    pub block: Option<usize>,
    /// Block-local label, or the master point index for block corners
    pub point: usize,
    /// Position the point kept
    pub position: Point,
}

/// Averages the unit normals of the faces incident to each point.
///
/// Points without incident faces get a zero normal.
pub fn average_point_normals<'a>(
    n_points: usize,
    points: &[Point],
    faces: impl IntoIterator<Item = &'a Face>,
) -> Vec<DVec3> {
    let mut normals = vec![DVec3::ZERO; n_points];
    for face in faces {
        let n = face.normal(points);
        for p in face.points() {
            normals[p] += n;
        }
    }
    for n in &mut normals {
        *n = n.normalize_or_zero();
    }
    normals
}
