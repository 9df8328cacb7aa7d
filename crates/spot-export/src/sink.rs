//! CSV and SQLite persistence for finalized tables.

use std::fs;
use std::path::Path;

use rusqlite::types::ToSqlOutput;
use rusqlite::{params, Connection, ToSql};
use tracing::debug;

use crate::error::SpotResult;
use crate::schema::determine_schema;
use crate::table::{CellValue, Table};

impl ToSql for CellValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            CellValue::Integer(v) => ToSqlOutput::from(*v),
            CellValue::Real(v) => ToSqlOutput::from(*v),
            CellValue::Text(v) => ToSqlOutput::from(v.as_str()),
            CellValue::Date(v) => ToSqlOutput::from(v.format("%Y-%m-%d").to_string()),
            CellValue::Timestamp(v) => {
                ToSqlOutput::from(v.format("%Y-%m-%d %H:%M:%S").to_string())
            }
            CellValue::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
        })
    }
}

/// Render a table as CSV text.
///
/// The header carries one slot per key column (a key column's label when
/// it has one, otherwise empty; the pivot column-axis name, when set,
/// occupies the final key slot) followed by the value-column names. One
/// comma-separated line per row, trailing newline included.
pub fn to_csv_string(table: &Table) -> String {
    let mut header: Vec<String> = table
        .key_labels()
        .iter()
        .map(|label| label.clone().unwrap_or_default())
        .collect();
    if let Some(axis) = table.column_axis_name() {
        if let Some(last) = header.last_mut() {
            if last.is_empty() {
                *last = axis.to_string();
            }
        }
    }
    header.extend(table.columns().iter().cloned());

    let mut out = String::new();
    out.push_str(&header.join(","));
    out.push('\n');

    for row in table.rows() {
        let cells: Vec<String> = row
            .keys
            .iter()
            .chain(row.values.iter())
            .map(CellValue::render)
            .collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

/// Write a table to a CSV file.
pub fn write_csv(table: &Table, path: &Path) -> SpotResult<()> {
    fs::write(path, to_csv_string(table))?;
    debug!(path = ?path, rows = table.n_rows(), "Wrote CSV output");
    Ok(())
}

/// Write a table to a SQLite database.
///
/// Creates the destination table from the inferred schema when it does not
/// exist, then upserts every row in one transaction, keyed by the
/// composite primary key.
pub fn write_sqlite(table: &Table, path: &Path, table_name: &str) -> SpotResult<()> {
    let schema = determine_schema(table, table_name)?;
    let mut conn = Connection::open(path)?;

    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        params![table_name],
        |row| row.get(0),
    )?;
    if !exists {
        conn.execute(&schema.create_table_sql(), [])?;
    }

    let column_list = schema
        .columns()
        .iter()
        .map(|(name, _)| format!("\"{}\"", name))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=schema.columns().len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let insert_sql = format!(
        "INSERT OR REPLACE INTO \"{}\" ({}) VALUES ({})",
        table_name, column_list, placeholders
    );

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(&insert_sql)?;
        for row in table.rows() {
            let cells: Vec<&CellValue> = row.keys.iter().chain(row.values.iter()).collect();
            stmt.execute(rusqlite::params_from_iter(cells))?;
        }
    }
    tx.commit()?;

    debug!(
        table = table_name,
        path = ?path,
        rows = table.n_rows(),
        "Wrote SQL output"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_table() -> Table {
        let mut table = Table::new(vec![None], vec!["values".to_string()]);
        table
            .push_row(
                vec![CellValue::Integer(1487311200)],
                vec![CellValue::Real(280.0)],
            )
            .unwrap();
        table
    }

    #[test]
    fn test_csv_unnamed_index() {
        assert_eq!(to_csv_string(&basic_table()), ",values\n1487311200,280.0\n");
    }

    #[test]
    fn test_csv_labelled_keys() {
        let mut table = Table::new(
            vec![Some("validity_date".to_string())],
            vec!["values".to_string()],
        );
        table
            .push_row(
                vec![CellValue::Text("2017-02-17".to_string())],
                vec![CellValue::Real(280.0)],
            )
            .unwrap();
        assert_eq!(
            to_csv_string(&table),
            "validity_date,values\n2017-02-17,280.0\n"
        );
    }

    #[test]
    fn test_csv_axis_name_fills_unnamed_corner() {
        let mut table = Table::new(vec![None], vec!["T+000".to_string()]);
        table
            .push_row(
                vec![CellValue::Integer(1487311200)],
                vec![CellValue::Real(280.0)],
            )
            .unwrap();
        table.set_column_axis_name("forecast_period");
        assert_eq!(
            to_csv_string(&table),
            "forecast_period,T+000\n1487311200,280.0\n"
        );
    }

    #[test]
    fn test_csv_null_renders_empty() {
        let mut table = Table::new(
            vec![None],
            vec!["T+000".to_string(), "T+001".to_string()],
        );
        table
            .push_row(
                vec![CellValue::Integer(1487311200)],
                vec![CellValue::Real(280.0), CellValue::Null],
            )
            .unwrap();
        assert_eq!(
            to_csv_string(&table),
            ",T+000,T+001\n1487311200,280.0,\n"
        );
    }

    #[test]
    fn test_sqlite_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spot.db");

        let table = basic_table();
        write_sqlite(&table, &path, "spotdata").unwrap();

        let conn = Connection::open(&path).unwrap();
        let (index, value): (i64, f64) = conn
            .query_row("SELECT \"index\", \"values\" FROM \"spotdata\"", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(index, 1487311200);
        assert_eq!(value, 280.0);
    }

    #[test]
    fn test_sqlite_rewrite_upserts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spot.db");

        let table = basic_table();
        write_sqlite(&table, &path, "spotdata").unwrap();
        write_sqlite(&table, &path, "spotdata").unwrap();

        let conn = Connection::open(&path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM \"spotdata\"", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
