//! Pipeline configuration for one tabularization run.

use std::path::PathBuf;

use crate::index::KeyColumnSpec;
use crate::pivot::PivotSpec;

/// Destination format for the finished table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Comma-separated file at the output path.
    Csv,
    /// Table in a SQLite database at the output path.
    Sql,
}

/// One extra key column: source descriptor and destination column name.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraColumnSpec {
    pub source: String,
    pub column: String,
}

impl ExtraColumnSpec {
    pub fn new(source: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            column: column.into(),
        }
    }
}

/// Immutable settings for one pipeline run.
///
/// Constructed once, passed by reference to each stage; no global state.
/// Every optional stage runs exactly when its spec is present, regardless
/// of data content.
#[derive(Debug)]
pub struct SpotDatabaseConfig {
    /// Destination format.
    pub format: OutputFormat,
    /// File path of the CSV file or SQLite database.
    pub output_path: PathBuf,
    /// Name of the destination SQL table.
    pub table_name: String,
    /// Name of the primary time coordinate forming the raw row index.
    pub primary_dim: String,
    /// Name of the column holding the physical quantity.
    pub value_column: String,
    /// Optional long-to-wide reshape.
    pub pivot: Option<PivotSpec>,
    /// Ordered derived key columns replacing the raw index.
    pub key_columns: Vec<KeyColumnSpec>,
    /// Ordered extra key columns, applied left-to-right.
    pub extra_columns: Vec<ExtraColumnSpec>,
    /// Dimension whose elements become distinct rows; `None` collapses
    /// each cube to a single row.
    pub slice_dim: Option<String>,
}

impl SpotDatabaseConfig {
    pub fn new(
        format: OutputFormat,
        output_path: impl Into<PathBuf>,
        table_name: impl Into<String>,
        primary_dim: impl Into<String>,
    ) -> Self {
        Self {
            format,
            output_path: output_path.into(),
            table_name: table_name.into(),
            primary_dim: primary_dim.into(),
            value_column: "values".to_string(),
            pivot: None,
            key_columns: Vec::new(),
            extra_columns: Vec::new(),
            slice_dim: None,
        }
    }

    pub fn with_pivot(mut self, pivot: PivotSpec) -> Self {
        self.pivot = Some(pivot);
        self
    }

    pub fn with_key_columns(mut self, specs: Vec<KeyColumnSpec>) -> Self {
        self.key_columns = specs;
        self
    }

    pub fn with_extra_column(
        mut self,
        source: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        self.extra_columns.push(ExtraColumnSpec::new(source, column));
        self
    }

    pub fn with_slice_dim(mut self, dim: impl Into<String>) -> Self {
        self.slice_dim = Some(dim.into());
        self
    }

    pub fn with_value_column(mut self, name: impl Into<String>) -> Self {
        self.value_column = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config =
            SpotDatabaseConfig::new(OutputFormat::Csv, "/tmp/out.csv", "spotdata", "time");
        assert_eq!(config.value_column, "values");
        assert!(config.pivot.is_none());
        assert!(config.key_columns.is_empty());
        assert!(config.extra_columns.is_empty());
        assert!(config.slice_dim.is_none());
    }

    #[test]
    fn test_builder_accumulates_extra_columns() {
        let config =
            SpotDatabaseConfig::new(OutputFormat::Csv, "/tmp/out.csv", "spotdata", "time")
                .with_extra_column("name", "cf_name")
                .with_extra_column("units", "cube_units");
        assert_eq!(config.extra_columns.len(), 2);
        assert_eq!(config.extra_columns[0].column, "cf_name");
    }
}
