//! Long-to-wide reshaping of tables along a pivot dimension.
//!
//! Pivoting turns one-row-per-(key, pivot-value) input into
//! one-row-per-key output with one column per distinct pivot label.
//! Forecasts at different lead times are sparse with respect to validity
//! time, so absent (key, label) cells are filled with the null marker
//! rather than dropped.

use std::fmt;

use tracing::debug;

use cube_model::{CoordValue, CubeError, DataCube};

use crate::error::{SpotError, SpotResult};
use crate::table::{CellValue, Table};

/// Maps a raw pivot-dimension coordinate value to an output column label.
pub type PivotMapFn = Box<dyn Fn(&CoordValue) -> String + Send + Sync>;

/// Pivot configuration: the dimension to reshape along and the label
/// mapping function. Constructed once per run, never mutated.
pub struct PivotSpec {
    dim: String,
    mapper: PivotMapFn,
}

impl PivotSpec {
    pub fn new(
        dim: impl Into<String>,
        mapper: impl Fn(&CoordValue) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            dim: dim.into(),
            mapper: Box::new(mapper),
        }
    }

    pub fn dim(&self) -> &str {
        &self.dim
    }

    pub fn label_for(&self, value: &CoordValue) -> String {
        (self.mapper)(value)
    }
}

impl fmt::Debug for PivotSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PivotSpec").field("dim", &self.dim).finish()
    }
}

/// Reshape a long-form table into wide form along the pivot dimension.
///
/// The cube supplies the raw pivot-dimension values: a scalar coordinate
/// broadcasts to every row; a coordinate with multiple points (a cube
/// concatenated across the pivot dimension upstream) maps to rows
/// cyclically in slice order. Rows are grouped by their full key tuple, and
/// any value columns other than `value_column` are dropped.
pub fn pivot_table(
    table: &Table,
    cube: &DataCube,
    spec: &PivotSpec,
    value_column: &str,
) -> SpotResult<Table> {
    let coord = cube
        .coordinate(spec.dim())
        .ok_or_else(|| CubeError::UnknownCoordinate(spec.dim().to_string()))?;

    let value_idx = table.column_index(value_column).ok_or_else(|| {
        SpotError::CoordinateMismatch(format!(
            "table has no '{}' column to pivot",
            value_column
        ))
    })?;

    let n_rows = table.n_rows();
    if coord.is_empty() || (n_rows > 0 && n_rows % coord.len() != 0) {
        return Err(SpotError::CoordinateMismatch(format!(
            "pivot coordinate '{}' holds {} points for {} rows",
            spec.dim(),
            coord.len(),
            n_rows
        )));
    }

    // Resolve each row's destination label, collecting distinct labels in
    // first-appearance order.
    let mut columns: Vec<String> = Vec::new();
    let mut row_labels: Vec<usize> = Vec::with_capacity(n_rows);
    for r in 0..n_rows {
        let label = spec.label_for(&coord.points()[r % coord.len()]);
        let idx = match columns.iter().position(|c| *c == label) {
            Some(idx) => idx,
            None => {
                columns.push(label);
                columns.len() - 1
            }
        };
        row_labels.push(idx);
    }

    // Group rows by key tuple, preserving first-appearance order.
    let mut keys: Vec<Vec<CellValue>> = Vec::new();
    let mut cells: Vec<Vec<CellValue>> = Vec::new();
    for (row, &label_idx) in table.rows().iter().zip(&row_labels) {
        let group = match keys.iter().position(|k| *k == row.keys) {
            Some(g) => g,
            None => {
                keys.push(row.keys.clone());
                cells.push(vec![CellValue::Null; columns.len()]);
                keys.len() - 1
            }
        };

        let value = row.values[value_idx].clone();
        let cell = &mut cells[group][label_idx];
        if !cell.is_null() && *cell != value {
            return Err(SpotError::CoordinateMismatch(format!(
                "conflicting values for key {:?} in pivot column '{}'",
                row.keys, columns[label_idx]
            )));
        }
        *cell = value;
    }

    let mut out = Table::new(table.key_labels().to_vec(), columns);
    for (key, values) in keys.into_iter().zip(cells) {
        out.push_row(key, values)?;
    }
    out.set_column_axis_name(spec.dim());

    debug!(
        dim = spec.dim(),
        rows = out.n_rows(),
        columns = out.columns().len(),
        "Pivoted table"
    );
    Ok(out)
}

/// Outer-merge two pivoted tables.
///
/// Key rows are unioned (accumulator order first, new keys appended) and
/// label columns are unioned, with every newly absent cell filled with the
/// null marker. Two differing non-null values landing in the same
/// (key, column) cell indicate inconsistent input cubes.
pub fn merge_pivoted(mut acc: Table, other: Table) -> SpotResult<Table> {
    if acc.key_labels() != other.key_labels() {
        return Err(SpotError::CoordinateMismatch(format!(
            "cannot merge tables with differing key columns ({:?} vs {:?})",
            acc.key_labels(),
            other.key_labels()
        )));
    }

    // Union the column sets, null-filling existing rows under new columns.
    let mut column_map: Vec<usize> = Vec::with_capacity(other.columns().len());
    let mut columns = acc.columns().to_vec();
    for name in other.columns() {
        let idx = match columns.iter().position(|c| c == name) {
            Some(idx) => idx,
            None => {
                columns.push(name.clone());
                columns.len() - 1
            }
        };
        column_map.push(idx);
    }

    let axis = acc
        .column_axis_name()
        .or(other.column_axis_name())
        .map(str::to_string);

    let mut merged = Table::new(acc.key_labels().to_vec(), columns);
    if let Some(axis) = axis {
        merged.set_column_axis_name(axis);
    }

    let width = merged.columns().len();
    for row in acc.rows_mut().drain(..) {
        let mut values = row.values;
        values.resize(width, CellValue::Null);
        merged.push_row(row.keys, values)?;
    }

    for row in other.rows() {
        let group = merged
            .rows()
            .iter()
            .position(|existing| existing.keys == row.keys);
        let group = match group {
            Some(g) => g,
            None => {
                merged.push_row(row.keys.clone(), vec![CellValue::Null; width])?;
                merged.n_rows() - 1
            }
        };

        for (src, &dst) in row.values.iter().zip(&column_map) {
            if src.is_null() {
                continue;
            }
            let existing = &merged.rows()[group].values[dst];
            if !existing.is_null() && existing != src {
                return Err(SpotError::CoordinateMismatch(format!(
                    "conflicting values for key {:?} in merged column '{}'",
                    row.keys,
                    merged.columns()[dst]
                )));
            }
            merged.rows_mut()[group].values[dst] = src.clone();
        }
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cube_model::CubeBuilder;

    fn lead_time_label(v: &CoordValue) -> String {
        format!("T+{:03}", v.as_i64().unwrap_or(0) / 3600)
    }

    fn single_time_cube(forecast_period_secs: i64) -> DataCube {
        CubeBuilder::new("air_temperature", "K")
            .dimension("time", vec![CoordValue::Int(1487311200)])
            .scalar_coord("forecast_period", CoordValue::Int(forecast_period_secs))
            .data(vec![280.0])
            .build()
            .unwrap()
    }

    fn long_table(rows: &[(i64, f64)]) -> Table {
        let mut table = Table::new(vec![None], vec!["values".to_string()]);
        for (time, value) in rows {
            table
                .push_row(
                    vec![CellValue::Integer(*time)],
                    vec![CellValue::Real(*value)],
                )
                .unwrap();
        }
        table
    }

    #[test]
    fn test_single_row_single_value() {
        let spec = PivotSpec::new("forecast_period", lead_time_label);
        let table = long_table(&[(1487311200, 280.0)]);

        let result = pivot_table(&table, &single_time_cube(0), &spec, "values").unwrap();
        assert_eq!(result.columns(), ["T+000".to_string()]);
        assert_eq!(result.n_rows(), 1);
        assert_eq!(result.rows()[0].values[0], CellValue::Real(280.0));
        assert_eq!(result.column_axis_name(), Some("forecast_period"));
    }

    #[test]
    fn test_concatenated_lead_times_fill_with_null() {
        // A cube concatenated across two lead times: forecast_period varies
        // along the time dimension.
        let cube = CubeBuilder::new("air_temperature", "K")
            .dimension(
                "time",
                vec![CoordValue::Int(1487311200), CoordValue::Int(1487314800)],
            )
            .aux_coord(
                "forecast_period",
                "time",
                vec![CoordValue::Int(0), CoordValue::Int(3600)],
            )
            .data(vec![280.0, 281.0])
            .build()
            .unwrap();

        let spec = PivotSpec::new("forecast_period", lead_time_label);
        let table = long_table(&[(1487311200, 280.0), (1487314800, 281.0)]);

        let result = pivot_table(&table, &cube, &spec, "values").unwrap();
        assert_eq!(
            result.columns(),
            ["T+000".to_string(), "T+001".to_string()]
        );
        assert_eq!(result.n_rows(), 2);
        assert_eq!(result.rows()[0].values, vec![
            CellValue::Real(280.0),
            CellValue::Null,
        ]);
        assert_eq!(result.rows()[1].values, vec![
            CellValue::Null,
            CellValue::Real(281.0),
        ]);
    }

    #[test]
    fn test_ancillary_columns_are_dropped() {
        // Columns beyond the key and value columns do not survive a pivot.
        let mut table = Table::new(
            vec![None],
            vec!["wmo_site".to_string(), "values".to_string()],
        );
        table
            .push_row(
                vec![CellValue::Integer(1487311200)],
                vec![CellValue::Integer(3001), CellValue::Real(280.0)],
            )
            .unwrap();

        let spec = PivotSpec::new("forecast_period", lead_time_label);
        let result = pivot_table(&table, &single_time_cube(0), &spec, "values").unwrap();
        assert_eq!(result.columns(), ["T+000".to_string()]);
        assert_eq!(result.rows()[0].values, vec![CellValue::Real(280.0)]);
    }

    #[test]
    fn test_missing_pivot_coordinate() {
        let cube = CubeBuilder::new("air_temperature", "K")
            .dimension("time", vec![CoordValue::Int(1487311200)])
            .data(vec![280.0])
            .build()
            .unwrap();
        let spec = PivotSpec::new("forecast_period", lead_time_label);
        let table = long_table(&[(1487311200, 280.0)]);

        assert!(pivot_table(&table, &cube, &spec, "values").is_err());
    }

    #[test]
    fn test_merge_unions_rows_and_columns() {
        let spec = PivotSpec::new("forecast_period", lead_time_label);

        let a = pivot_table(
            &long_table(&[(1487311200, 280.0)]),
            &single_time_cube(0),
            &spec,
            "values",
        )
        .unwrap();
        let b = pivot_table(
            &long_table(&[(1487314800, 281.0)]),
            &single_time_cube(3600),
            &spec,
            "values",
        )
        .unwrap();

        let merged = merge_pivoted(a, b).unwrap();
        assert_eq!(
            merged.columns(),
            ["T+000".to_string(), "T+001".to_string()]
        );
        assert_eq!(merged.n_rows(), 2);
        assert_eq!(merged.rows()[0].values, vec![
            CellValue::Real(280.0),
            CellValue::Null,
        ]);
        assert_eq!(merged.rows()[1].values, vec![
            CellValue::Null,
            CellValue::Real(281.0),
        ]);
    }

    #[test]
    fn test_merge_same_key_same_label_merges_rows() {
        // Two slices mapping to the same label and key must merge, not
        // produce duplicate key rows.
        let spec = PivotSpec::new("forecast_period", lead_time_label);
        let a = pivot_table(
            &long_table(&[(1487311200, 280.0)]),
            &single_time_cube(0),
            &spec,
            "values",
        )
        .unwrap();
        let b = pivot_table(
            &long_table(&[(1487311200, 280.0)]),
            &single_time_cube(0),
            &spec,
            "values",
        )
        .unwrap();

        let merged = merge_pivoted(a, b).unwrap();
        assert_eq!(merged.n_rows(), 1);
        assert_eq!(merged.columns(), ["T+000".to_string()]);
    }

    #[test]
    fn test_merge_conflicting_cells_fail() {
        let spec = PivotSpec::new("forecast_period", lead_time_label);
        let a = pivot_table(
            &long_table(&[(1487311200, 280.0)]),
            &single_time_cube(0),
            &spec,
            "values",
        )
        .unwrap();
        let b = pivot_table(
            &long_table(&[(1487311200, 999.0)]),
            &single_time_cube(0),
            &spec,
            "values",
        )
        .unwrap();

        assert!(matches!(
            merge_pivoted(a, b),
            Err(SpotError::CoordinateMismatch(_))
        ));
    }
}
