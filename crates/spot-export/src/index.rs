//! Derivation of composite primary keys from the raw row index.

use std::fmt;

use tracing::debug;

use crate::error::{SpotError, SpotResult};
use crate::table::{CellValue, Table};

/// Transforms the raw row-index value into a derived key value.
///
/// Errors are surfaced as [`SpotError::KeyDerivation`] with the destination
/// column name attached.
pub type KeyTransformFn =
    Box<dyn Fn(&CellValue) -> Result<CellValue, String> + Send + Sync>;

/// One derived key column: its name and the transform producing it.
pub struct KeyColumnSpec {
    name: String,
    transform: KeyTransformFn,
}

impl KeyColumnSpec {
    pub fn new(
        name: impl Into<String>,
        transform: impl Fn(&CellValue) -> Result<CellValue, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            transform: Box::new(transform),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, value: &CellValue) -> SpotResult<CellValue> {
        (self.transform)(value).map_err(|message| SpotError::KeyDerivation {
            column: self.name.clone(),
            message,
        })
    }
}

impl fmt::Debug for KeyColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyColumnSpec")
            .field("name", &self.name)
            .finish()
    }
}

/// Replace the table's key columns with derived ones.
///
/// Each spec entry computes one new labelled key column by applying its
/// transform to the row's current index value; the prior key columns are
/// dropped and the new set installed in spec order. An empty spec is a
/// no-op and the existing index is retained unchanged.
pub fn map_primary_index(table: &mut Table, specs: &[KeyColumnSpec]) -> SpotResult<()> {
    if specs.is_empty() {
        return Ok(());
    }
    if table.key_labels().is_empty() {
        return Err(SpotError::CoordinateMismatch(
            "table has no index to derive key columns from".to_string(),
        ));
    }

    for row in table.rows_mut().iter_mut() {
        let index_value = row.keys[0].clone();
        let mut keys = Vec::with_capacity(specs.len());
        for spec in specs {
            keys.push(spec.apply(&index_value)?);
        }
        row.keys = keys;
    }

    table.set_key_labels(specs.iter().map(|s| Some(s.name.clone())).collect());
    debug!(key_columns = specs.len(), "Mapped primary index");
    Ok(())
}

/// Common transforms over epoch-second index values.
pub mod transforms {
    use chrono::{DateTime, Timelike};

    use crate::table::CellValue;

    fn epoch(value: &CellValue) -> Result<DateTime<chrono::Utc>, String> {
        match value {
            CellValue::Integer(secs) => DateTime::from_timestamp(*secs, 0)
                .ok_or_else(|| format!("{} is out of range for a timestamp", secs)),
            other => Err(format!("expected epoch seconds, got {:?}", other)),
        }
    }

    /// Calendar date of an epoch-seconds value (UTC).
    pub fn validity_date(value: &CellValue) -> Result<CellValue, String> {
        Ok(CellValue::Date(epoch(value)?.date_naive()))
    }

    /// Hour of day of an epoch-seconds value, encoded as HHMM (UTC).
    pub fn validity_time(value: &CellValue) -> Result<CellValue, String> {
        Ok(CellValue::Integer(i64::from(epoch(value)?.hour()) * 100))
    }
}
