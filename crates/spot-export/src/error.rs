//! Error types for the spot-export crate.

use thiserror::Error;

use cube_model::CubeError;

/// Errors raised while tabularizing cubes or writing the result.
#[derive(Debug, Error)]
pub enum SpotError {
    /// Key columns or coordinate sets differ unexpectedly between cubes
    /// being merged. Fatal; no partial output is written.
    #[error("Coordinate mismatch: {0}")]
    CoordinateMismatch(String),

    /// A caller-supplied primary-key transform failed on a row value.
    #[error("Failed to derive key column '{column}': {message}")]
    KeyDerivation { column: String, message: String },

    /// No primary key could be inferred for the output table.
    #[error("Schema inference failed: {0}")]
    SchemaInference(String),

    #[error("Cube error: {0}")]
    Cube(#[from] CubeError),

    #[error("Failed to write output: {0}")]
    SinkIo(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type for spot-export operations.
pub type SpotResult<T> = std::result::Result<T, SpotError>;
