//! Merging independently fetched variable tables into one wide table.

use crate::error::Error;
use crate::table::{Table, TableError};
use log::warn;

/// Columns the per-variable tables are joined on by default.
pub const JOIN_KEYS: &[&str] = &["id", "area", "year"];

/// Columns removed from the merged table by default; `area` and `year`
/// remain as the externally visible key.
pub const DROP_AFTER_MERGE: &[&str] = &["id"];

/// Inner-join a list of tables on the `on` columns, left to right, then
/// remove the `drop` columns from the result.
///
/// A single-element list folds to that element unchanged (the drop still
/// applies). An empty list or a failed join is an error. A failed drop —
/// a `drop` column absent from the joined table — degrades to the
/// joined-but-undropped table with a warning.
pub fn merge_tables(tables: &[Table], on: &[&str], drop: &[&str]) -> Result<Table, Error> {
    let mut iter = tables.iter();
    let Some(first) = iter.next() else {
        warn!("nothing to merge");
        return Err(Error::Merge(TableError::NoTables));
    };

    let mut merged = first.clone();
    for table in iter {
        merged = merged.inner_join(table, on).map_err(|e| {
            warn!("could not merge tables: {e}");
            Error::Merge(e)
        })?;
    }

    match merged.without_columns(drop) {
        Ok(table) => Ok(table),
        Err(e) => {
            warn!("could not drop {drop:?} after merge: {e}");
            Ok(merged)
        }
    }
}
