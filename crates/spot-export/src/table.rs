//! Row-oriented tabular data with designated key columns.
//!
//! A [`Table`] is the in-memory shape every pipeline stage works on: an
//! ordered set of key columns (together forming the composite row identity)
//! followed by ordered value columns. Key columns may be unlabelled -- the
//! raw row index produced by cube flattening has no name until the
//! primary-key mapping stage replaces it.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use cube_model::CoordValue;

use crate::error::{SpotError, SpotResult};

/// Default schema name for an unlabelled key column.
pub const DEFAULT_INDEX_NAME: &str = "index";

/// A single table cell.
///
/// `Null` is the designated null marker: it denotes "no value observed for
/// this key/column combination" after an outer-join merge, and is rendered
/// as an empty CSV field or a SQL NULL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Integer(i64),
    Real(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Null,
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Render the cell for the CSV sink.
    ///
    /// Integral floats keep their decimal point (`280.0`, not `280`),
    /// matching the sink's default decimal formatting.
    pub fn render(&self) -> String {
        match self {
            CellValue::Integer(v) => v.to_string(),
            CellValue::Real(v) => format!("{:?}", v),
            CellValue::Text(v) => v.clone(),
            CellValue::Date(v) => v.format("%Y-%m-%d").to_string(),
            CellValue::Timestamp(v) => v.format("%Y-%m-%d %H:%M:%S").to_string(),
            CellValue::Null => String::new(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Integer(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Real(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(v: NaiveDate) -> Self {
        CellValue::Date(v)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(v: DateTime<Utc>) -> Self {
        CellValue::Timestamp(v)
    }
}

impl From<&CoordValue> for CellValue {
    fn from(v: &CoordValue) -> Self {
        match v {
            CoordValue::Int(i) => CellValue::Integer(*i),
            CoordValue::Float(f) => CellValue::Real(*f),
            CoordValue::Text(s) => CellValue::Text(s.clone()),
        }
    }
}

/// One table row: key cells followed by value cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub keys: Vec<CellValue>,
    pub values: Vec<CellValue>,
}

/// An ordered sequence of rows with designated key columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Labels of the key columns, in key order. `None` marks the raw,
    /// not-yet-derived row index.
    key_labels: Vec<Option<String>>,
    /// Value column names, in column order.
    columns: Vec<String>,
    rows: Vec<Row>,
    /// Name of the pivot dimension once the column axis has been pivoted.
    column_axis_name: Option<String>,
}

impl Table {
    pub fn new(key_labels: Vec<Option<String>>, columns: Vec<String>) -> Self {
        Self {
            key_labels,
            columns,
            rows: Vec::new(),
            column_axis_name: None,
        }
    }

    /// Append a row, checking cell counts against the column sets.
    pub fn push_row(&mut self, keys: Vec<CellValue>, values: Vec<CellValue>) -> SpotResult<()> {
        if keys.len() != self.key_labels.len() || values.len() != self.columns.len() {
            return Err(SpotError::CoordinateMismatch(format!(
                "row holds {}+{} cells but the table has {}+{} columns",
                keys.len(),
                values.len(),
                self.key_labels.len(),
                self.columns.len()
            )));
        }
        self.rows.push(Row { keys, values });
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn key_labels(&self) -> &[Option<String>] {
        &self.key_labels
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Row> {
        &mut self.rows
    }

    pub(crate) fn set_key_labels(&mut self, labels: Vec<Option<String>>) {
        self.key_labels = labels;
    }

    pub(crate) fn push_key_column(&mut self, label: String) {
        self.key_labels.push(Some(label));
    }

    /// Index of a value column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// True when `name` exists as a value column or a key-column label.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
            || self.key_labels.iter().any(|l| l.as_deref() == Some(name))
    }

    pub fn column_axis_name(&self) -> Option<&str> {
        self.column_axis_name.as_deref()
    }

    pub fn set_column_axis_name(&mut self, name: impl Into<String>) {
        self.column_axis_name = Some(name.into());
    }

    /// Key-column names for schema generation.
    ///
    /// A single unlabelled key column takes the relational default
    /// `index`; several unlabelled columns are numbered by position.
    pub fn key_schema_names(&self) -> Vec<String> {
        let unnamed = self.key_labels.iter().filter(|l| l.is_none()).count();
        self.key_labels
            .iter()
            .enumerate()
            .map(|(i, label)| match label {
                Some(name) => name.clone(),
                None if unnamed == 1 => DEFAULT_INDEX_NAME.to_string(),
                None => format!("level_{}", i),
            })
            .collect()
    }

    /// Append another table's rows in order.
    ///
    /// Both tables must share the same key and value column sets.
    pub fn concat(&mut self, other: Table) -> SpotResult<()> {
        if self.key_labels != other.key_labels || self.columns != other.columns {
            return Err(SpotError::CoordinateMismatch(format!(
                "cannot concatenate tables with differing columns ({:?} vs {:?})",
                self.columns, other.columns
            )));
        }
        self.rows.extend(other.rows);
        Ok(())
    }
}
