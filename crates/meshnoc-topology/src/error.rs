//! Error types for meshnoc-topology.

use thiserror::Error;

use crate::Coord;

/// Result type for meshnoc-topology operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised when building or addressing a mesh.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A mesh must have at least one node in each dimension.
    #[error("mesh dimensions must be non-zero, got {width}x{height}")]
    EmptyMesh { width: u16, height: u16 },

    /// The coordinate lies outside the mesh.
    #[error("coordinate {coord} is outside a {width}x{height} mesh")]
    OutOfBounds { coord: Coord, width: u16, height: u16 },
}
