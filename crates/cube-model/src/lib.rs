//! Labelled forecast-cube data model.
//!
//! Provides the multi-dimensional, coordinate-labelled array type consumed
//! by the spot tabularization pipeline:
//!
//! - [`DataCube`]: immutable labelled numeric array with named dimension and
//!   auxiliary coordinates, a semantic name, a physical unit and string
//!   attributes
//! - [`CubeBuilder`]: one-shot construction with shape validation
//! - [`Coordinate`] / [`CoordValue`]: named coordinate vectors and their
//!   heterogeneous scalar points

pub mod coords;
pub mod cube;
pub mod error;

pub use coords::{CoordValue, Coordinate};
pub use cube::{CubeBuilder, DataCube};
pub use error::{CubeError, CubeResult};
