//! # Block Mesh Errors
//!
//! Error types for block mesh generation.
//!
//! ## Error Policy
//!
//! - Configuration and topology failures are fatal and abort `build()`
//! - Projection misses are not errors; they are collected as
//!   [`ProjectionMiss`](crate::projection::ProjectionMiss) warnings
//! - Errors carry the offending block and face for debugging

use config::constants::ConfigError;
use thiserror::Error;

/// Errors that can occur during block mesh generation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BlockMeshError {
    /// Invalid per-block or per-edge parameters, detected at construction.
    #[error("Configuration error{}: {message}", block_suffix(.block))]
    Configuration {
        /// Offending block, when the error belongs to one
        block: Option<usize>,
        /// Description of the problem
        message: String,
    },

    /// Inconsistent block topology, detected while matching faces or merging.
    #[error("Topology error in block {block}{}{}: {message}", face_suffix(.face), neighbour_suffix(.neighbour))]
    Topology {
        /// Offending block
        block: usize,
        /// Logical face (0..6) of the offending block, if the error belongs to one
        face: Option<usize>,
        /// Block and face on the other side, if any
        neighbour: Option<(usize, usize)>,
        /// Description of the problem
        message: String,
    },

    /// Invalid projection surface data.
    #[error("Surface error in '{surface}': {message}")]
    Surface {
        /// Surface name
        surface: String,
        /// Description of the problem
        message: String,
    },

    /// Invalid global settings.
    #[error("Invalid settings: {0}")]
    Settings(#[from] ConfigError),
}

fn block_suffix(block: &Option<usize>) -> String {
    block.map(|b| format!(" in block {b}")).unwrap_or_default()
}

fn face_suffix(face: &Option<usize>) -> String {
    face.map(|f| format!(" face {f}")).unwrap_or_default()
}

fn neighbour_suffix(neighbour: &Option<(usize, usize)>) -> String {
    neighbour
        .map(|(b, f)| format!(" (neighbour block {b} face {f})"))
        .unwrap_or_default()
}

impl BlockMeshError {
    /// Creates a configuration error for a block.
    pub fn configuration(block: usize, message: impl Into<String>) -> Self {
        Self::Configuration {
            block: Some(block),
            message: message.into(),
        }
    }

    /// Creates a configuration error not tied to a block.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::Configuration {
            block: None,
            message: message.into(),
        }
    }

    /// Creates a topology error for a block face.
    pub fn topology(block: usize, face: usize, message: impl Into<String>) -> Self {
        Self::Topology {
            block,
            face: Some(face),
            neighbour: None,
            message: message.into(),
        }
    }

    /// Creates a topology error for a block as a whole, such as a shared edge
    /// or corner that does not match.
    pub fn topology_block(block: usize, message: impl Into<String>) -> Self {
        Self::Topology {
            block,
            face: None,
            neighbour: None,
            message: message.into(),
        }
    }

    /// Creates a topology error for a pair of block faces.
    pub fn topology_pair(
        block: usize,
        face: usize,
        neighbour: (usize, usize),
        message: impl Into<String>,
    ) -> Self {
        Self::Topology {
            block,
            face: Some(face),
            neighbour: Some(neighbour),
            message: message.into(),
        }
    }

    /// Creates a surface error.
    pub fn surface(surface: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Surface {
            surface: surface.into(),
            message: message.into(),
        }
    }

    /// Returns true for errors raised while validating block parameters.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Returns true for errors raised while matching block topology.
    pub fn is_topology(&self) -> bool {
        matches!(self, Self::Topology { .. })
    }
}

/// Result type alias for block mesh operations.
pub type BlockMeshResult<T> = Result<T, BlockMeshError>;
