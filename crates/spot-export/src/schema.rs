//! SQL schema inference from finalized tables.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SpotError, SpotResult};
use crate::table::{CellValue, Table};

/// SQL column types the inferencer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlType {
    Integer,
    Real,
    Text,
    Timestamp,
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Text => "TEXT",
            SqlType::Timestamp => "TIMESTAMP",
        };
        write!(f, "{}", s)
    }
}

/// Typed column list plus primary-key constraint for one output table.
///
/// Derived from a [`Table`] on demand, never persisted independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    table: String,
    columns: Vec<(String, SqlType)>,
    keys: Vec<String>,
}

impl SchemaDescriptor {
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[(String, SqlType)] {
        &self.columns
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Render the `CREATE TABLE` statement.
    ///
    /// The output is byte-stable for identical input shapes: one line per
    /// column in table order followed by the composite primary-key
    /// constraint.
    pub fn create_table_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|(name, ty)| format!("\"{}\" {}", name, ty))
            .collect::<Vec<_>>()
            .join(",\n  ");
        let keys = self
            .keys
            .iter()
            .map(|k| format!("\"{}\"", k))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "CREATE TABLE \"{}\" (\n{},\n  CONSTRAINT {}_pk PRIMARY KEY ({})\n)",
            self.table, columns, self.table, keys
        )
    }
}

/// Infer a typed schema from a finalized table.
///
/// Key columns come first, in key order, then value columns in table
/// order. Fails when the table has no key columns to build a primary key
/// from.
pub fn determine_schema(table: &Table, name: &str) -> SpotResult<SchemaDescriptor> {
    if table.key_labels().is_empty() {
        return Err(SpotError::SchemaInference(format!(
            "table '{}' has no key columns to form a primary key",
            name
        )));
    }

    let keys = table.key_schema_names();
    let mut columns = Vec::with_capacity(keys.len() + table.columns().len());

    for (i, key) in keys.iter().enumerate() {
        let ty = infer_type(table.rows().iter().map(|r| &r.keys[i]));
        columns.push((key.clone(), ty));
    }
    for (i, column) in table.columns().iter().enumerate() {
        let ty = infer_type(table.rows().iter().map(|r| &r.values[i]));
        columns.push((column.clone(), ty));
    }

    Ok(SchemaDescriptor {
        table: name.to_string(),
        columns,
        keys,
    })
}

/// Infer one column's SQL type from its cells.
///
/// Any text forces TEXT; mixed integer/float widens to REAL; date-like
/// cells map to TIMESTAMP unless mixed with numerics. All-null columns
/// default to TEXT.
fn infer_type<'a>(cells: impl Iterator<Item = &'a CellValue>) -> SqlType {
    let mut has_int = false;
    let mut has_real = false;
    let mut has_text = false;
    let mut has_time = false;

    for cell in cells {
        match cell {
            CellValue::Integer(_) => has_int = true,
            CellValue::Real(_) => has_real = true,
            CellValue::Text(_) => has_text = true,
            CellValue::Date(_) | CellValue::Timestamp(_) => has_time = true,
            CellValue::Null => {}
        }
    }

    if has_text {
        SqlType::Text
    } else if has_time {
        if has_int || has_real {
            SqlType::Text
        } else {
            SqlType::Timestamp
        }
    } else if has_real {
        SqlType::Real
    } else if has_int {
        SqlType::Integer
    } else {
        SqlType::Text
    }
}
