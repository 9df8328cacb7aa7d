//! Flattening of labelled cubes into row-oriented tables.

use tracing::debug;

use cube_model::{CubeError, DataCube};

use crate::error::SpotResult;
use crate::table::{CellValue, Table};

/// Flatten one cube into a long-form table.
///
/// Emits one row per point of the primary time coordinate, keyed by the raw
/// coordinate value (unlabelled until the primary-key mapping stage), with a
/// single value column holding the payload. A cube whose residual
/// dimensions are not length one cannot be flattened; slice it first.
///
/// NaN payload values become the null marker.
pub fn cube_to_frame(
    cube: &DataCube,
    primary_dim: &str,
    value_column: &str,
) -> SpotResult<Table> {
    let coord = cube
        .coordinate(primary_dim)
        .ok_or_else(|| CubeError::UnknownCoordinate(primary_dim.to_string()))?;

    let series = if cube.has_dim(primary_dim) {
        cube.series(primary_dim)?
    } else {
        // Scalar collapse: the whole cube is a single row.
        vec![cube.scalar_value()?]
    };

    if coord.len() != series.len() {
        return Err(CubeError::ShapeMismatch(format!(
            "coordinate '{}' holds {} points but the cube yields {} values",
            primary_dim,
            coord.len(),
            series.len()
        ))
        .into());
    }

    let mut table = Table::new(vec![None], vec![value_column.to_string()]);
    for (point, value) in coord.points().iter().zip(series) {
        let cell = if value.is_nan() {
            CellValue::Null
        } else {
            CellValue::Real(value)
        };
        table.push_row(vec![CellValue::from(point)], vec![cell])?;
    }

    debug!(
        cube = %cube.name(),
        rows = table.n_rows(),
        "Flattened cube into frame"
    );
    Ok(table)
}
