//! Tabularization of spot forecast cubes for relational sinks.
//!
//! Converts coordinate-labelled spot forecast data into flat tabular
//! records and writes them to a CSV file or a SQL table:
//!
//! - [`frame`]: flattening cubes into long-form tables
//! - [`pivot`]: long-to-wide reshaping along a configured dimension, with
//!   outer-join merging and null-fill across slices
//! - [`index`]: derivation of composite primary keys from the raw index
//! - [`columns`]: injection of extra key columns from coordinates, cube
//!   metadata or literals
//! - [`schema`]: typed `CREATE TABLE` inference with a composite
//!   primary-key constraint
//! - [`sink`]: CSV and SQLite writers
//! - [`database`]: the [`SpotDatabase`] pipeline tying the stages together
//!
//! The pipeline is a synchronous, one-shot batch transform: one run
//! consumes a fixed collection of cubes, produces one table and performs
//! one write.

pub mod columns;
pub mod config;
pub mod database;
pub mod error;
pub mod frame;
pub mod index;
pub mod pivot;
pub mod schema;
pub mod sink;
pub mod table;

// Re-exports
pub use columns::{insert_extra_mapped_columns, resolve_source, ColumnSource};
pub use config::{ExtraColumnSpec, OutputFormat, SpotDatabaseConfig};
pub use database::SpotDatabase;
pub use error::{SpotError, SpotResult};
pub use frame::cube_to_frame;
pub use index::{map_primary_index, transforms, KeyColumnSpec, KeyTransformFn};
pub use pivot::{merge_pivoted, pivot_table, PivotMapFn, PivotSpec};
pub use schema::{determine_schema, SchemaDescriptor, SqlType};
pub use table::{CellValue, Row, Table, DEFAULT_INDEX_NAME};
