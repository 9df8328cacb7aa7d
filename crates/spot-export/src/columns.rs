//! Injection of auxiliary key columns from cube metadata.

use tracing::debug;

use cube_model::{CubeError, DataCube};

use crate::error::{SpotError, SpotResult};
use crate::table::{CellValue, Table};

/// Where an extra column's values come from.
///
/// Resolved from a source descriptor by ordered-priority match; an
/// unresolvable descriptor falls back to a literal constant rather than
/// erroring.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSource {
    /// A named coordinate on the cube.
    Coordinate(String),
    /// The cube's semantic name.
    CubeName,
    /// The cube's physical-unit string.
    CubeUnits,
    /// A value from the cube's attribute mapping.
    Attribute(String),
    /// The descriptor itself, broadcast verbatim.
    Literal(String),
}

/// Resolve a source descriptor against a cube.
///
/// Priority order: coordinate, the `name` keyword, the `units` keyword, an
/// attribute key, then literal fallback.
pub fn resolve_source(cube: &DataCube, descriptor: &str) -> ColumnSource {
    if cube.coordinate(descriptor).is_some() {
        ColumnSource::Coordinate(descriptor.to_string())
    } else if descriptor == "name" {
        ColumnSource::CubeName
    } else if descriptor == "units" {
        ColumnSource::CubeUnits
    } else if cube.attributes().contains_key(descriptor) {
        ColumnSource::Attribute(descriptor.to_string())
    } else {
        ColumnSource::Literal(descriptor.to_string())
    }
}

/// Append one extra column, sourced per `descriptor`, as both a data
/// column and an additional key column.
///
/// Coordinate sources assign per-row values positionally in slice order
/// (scalar coordinates broadcast); every other source broadcasts a single
/// string. If the destination column already exists the call is idempotent
/// and the table is left unchanged.
pub fn insert_extra_mapped_columns(
    table: &mut Table,
    cube: &DataCube,
    descriptor: &str,
    destination: &str,
) -> SpotResult<()> {
    if table.has_column(destination) {
        debug!(
            column = destination,
            "Extra column already present, leaving table unchanged"
        );
        return Ok(());
    }

    let source = resolve_source(cube, descriptor);
    let n_rows = table.n_rows();

    let cells: Vec<CellValue> = match &source {
        ColumnSource::Coordinate(name) => {
            let coord = cube
                .coordinate(name)
                .ok_or_else(|| CubeError::UnknownCoordinate(name.clone()))?;
            if coord.len() > 1 && n_rows % coord.len() != 0 {
                return Err(SpotError::CoordinateMismatch(format!(
                    "coordinate '{}' holds {} points for {} rows",
                    name,
                    coord.len(),
                    n_rows
                )));
            }
            (0..n_rows)
                .map(|r| CellValue::from(&coord.points()[r % coord.len()]))
                .collect()
        }
        ColumnSource::CubeName => vec![CellValue::from(cube.name()); n_rows],
        ColumnSource::CubeUnits => vec![CellValue::from(cube.units()); n_rows],
        ColumnSource::Attribute(key) => {
            let value = cube.attributes()[key].as_str();
            vec![CellValue::from(value); n_rows]
        }
        ColumnSource::Literal(text) => vec![CellValue::from(text.as_str()); n_rows],
    };

    for (row, cell) in table.rows_mut().iter_mut().zip(cells) {
        row.keys.push(cell);
    }
    table.push_key_column(destination.to_string());

    debug!(column = destination, source = ?source, "Inserted extra key column");
    Ok(())
}
