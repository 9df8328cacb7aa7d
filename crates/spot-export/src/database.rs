//! Pipeline orchestration: cubes in, CSV or SQL table out.

use tracing::debug;

use cube_model::DataCube;

use crate::columns::insert_extra_mapped_columns;
use crate::config::{OutputFormat, SpotDatabaseConfig};
use crate::error::{SpotError, SpotResult};
use crate::frame::cube_to_frame;
use crate::index::map_primary_index;
use crate::pivot::{merge_pivoted, pivot_table};
use crate::schema::{determine_schema, SchemaDescriptor};
use crate::sink;
use crate::table::Table;

/// One-shot tabularization pipeline.
///
/// Flattens spot forecast cubes into a single table per run and writes it
/// to the configured sink. Fully synchronous; each run owns its table
/// exclusively and leaves no state behind beyond the sink itself.
pub struct SpotDatabase {
    config: SpotDatabaseConfig,
}

impl SpotDatabase {
    pub fn new(config: SpotDatabaseConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SpotDatabaseConfig {
        &self.config
    }

    /// Run the tabularization stages over the supplied cubes.
    ///
    /// Per cube and per slice: flatten, pivot (when configured), derive
    /// the primary key (when configured), insert extra key columns (in
    /// configured order), then fold into the accumulated table -- outer
    /// merge for pivoted output, concatenation otherwise.
    pub fn to_table(&self, cubes: &[DataCube]) -> SpotResult<Table> {
        if cubes.is_empty() {
            return Err(SpotError::CoordinateMismatch(
                "no input cubes to tabularize".to_string(),
            ));
        }

        let mut acc: Option<Table> = None;
        for cube in cubes {
            let slices = match &self.config.slice_dim {
                Some(dim) => cube.slice_along(dim)?,
                None => vec![cube.clone()],
            };

            for slice in &slices {
                let mut table =
                    cube_to_frame(slice, &self.config.primary_dim, &self.config.value_column)?;

                if let Some(pivot) = &self.config.pivot {
                    table = pivot_table(&table, slice, pivot, &self.config.value_column)?;
                }

                map_primary_index(&mut table, &self.config.key_columns)?;

                for extra in &self.config.extra_columns {
                    insert_extra_mapped_columns(&mut table, slice, &extra.source, &extra.column)?;
                }

                acc = Some(match acc.take() {
                    None => table,
                    Some(prev) if self.config.pivot.is_some() => merge_pivoted(prev, table)?,
                    Some(mut prev) => {
                        prev.concat(table)?;
                        prev
                    }
                });
            }
        }

        let table = acc.ok_or_else(|| {
            SpotError::CoordinateMismatch("input cubes produced no rows".to_string())
        })?;
        debug!(
            rows = table.n_rows(),
            key_columns = table.key_labels().len(),
            columns = table.columns().len(),
            "Built output table"
        );
        Ok(table)
    }

    /// Infer the SQL schema of a finalized table under the configured
    /// table name.
    pub fn determine_schema(&self, table: &Table) -> SpotResult<SchemaDescriptor> {
        determine_schema(table, &self.config.table_name)
    }

    /// Build the table and write it to the configured sink.
    pub fn process(&self, cubes: &[DataCube]) -> SpotResult<()> {
        let table = self.to_table(cubes)?;
        match self.config.format {
            OutputFormat::Csv => sink::write_csv(&table, &self.config.output_path)?,
            OutputFormat::Sql => {
                sink::write_sqlite(&table, &self.config.output_path, &self.config.table_name)?
            }
        }
        Ok(())
    }
}
