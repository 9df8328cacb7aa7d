//! Error types for the cube-model crate.

use thiserror::Error;

/// Errors raised when reading or constructing a data cube.
#[derive(Debug, Error)]
pub enum CubeError {
    #[error("Unknown dimension: {0}")]
    UnknownDimension(String),

    #[error("Unknown coordinate: {0}")]
    UnknownCoordinate(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Invalid cube definition: {0}")]
    InvalidCube(String),
}

/// Result type for cube operations.
pub type CubeResult<T> = std::result::Result<T, CubeError>;
