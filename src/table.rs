//! A small in-memory table: ordered rows over a fixed, named column set.
//!
//! Cells are [`serde_json::Value`] so the table can carry whatever the API
//! returns (numbers, strings, nulls) without committing to a schema up
//! front. All shaping operations are functional: they return a new `Table`
//! and leave the receiver untouched, so callers can fall back to the
//! unshaped input when an operation fails.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Failures in table shaping and joining.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("no such column: {0}")]
    NoSuchColumn(String),
    #[error("cannot merge an empty list of tables")]
    NoTables,
}

/// Ordered rows with a fixed column set, stable across all rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// An empty table with the given column names.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append one row. The row must be as wide as the column set.
    pub fn push_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len(), "row width mismatch");
        self.rows.push(row);
    }

    fn column_index(&self, name: &str) -> Result<usize, TableError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| TableError::NoSuchColumn(name.to_string()))
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Result<Vec<&Value>, TableError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// A copy with `from` renamed to `to`. Fails if `from` is absent.
    pub fn renamed(&self, from: &str, to: &str) -> Result<Table, TableError> {
        let idx = self.column_index(from)?;
        let mut out = self.clone();
        out.columns[idx] = to.to_string();
        Ok(out)
    }

    /// A copy without the named columns. Fails if any of them is absent.
    pub fn without_columns(&self, names: &[&str]) -> Result<Table, TableError> {
        let mut dropped = Vec::with_capacity(names.len());
        for name in names {
            dropped.push(self.column_index(name)?);
        }
        let keep: Vec<usize> = (0..self.columns.len())
            .filter(|i| !dropped.contains(i))
            .collect();
        Ok(self.project(&keep))
    }

    /// A copy with exactly the named columns, in the given order.
    pub fn select(&self, names: &[&str]) -> Result<Table, TableError> {
        let keep = names
            .iter()
            .map(|n| self.column_index(n))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.project(&keep))
    }

    fn project(&self, indices: &[usize]) -> Table {
        Table {
            columns: indices.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }

    /// Hash-based inner equi-join on the `on` columns.
    ///
    /// The right side is indexed by key, then the left side streams through
    /// it; matching rows are emitted in left-row order. Output columns are
    /// the left columns followed by the right's non-key columns; a right
    /// column whose name already exists on the left gets a `_y` suffix.
    /// Fails if either side lacks one of the key columns.
    pub fn inner_join(&self, right: &Table, on: &[&str]) -> Result<Table, TableError> {
        let left_keys = on
            .iter()
            .map(|c| self.column_index(c))
            .collect::<Result<Vec<_>, _>>()?;
        let right_keys = on
            .iter()
            .map(|c| right.column_index(c))
            .collect::<Result<Vec<_>, _>>()?;
        let right_payload: Vec<usize> = (0..right.columns.len())
            .filter(|i| !right_keys.contains(i))
            .collect();

        let mut columns = self.columns.clone();
        for &i in &right_payload {
            let name = &right.columns[i];
            if columns.iter().any(|c| c == name) {
                columns.push(format!("{name}_y"));
            } else {
                columns.push(name.clone());
            }
        }

        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (ri, row) in right.rows.iter().enumerate() {
            index.entry(join_key(row, &right_keys)).or_default().push(ri);
        }

        let mut out = Table {
            columns,
            rows: Vec::new(),
        };
        for left_row in &self.rows {
            if let Some(matches) = index.get(&join_key(left_row, &left_keys)) {
                for &ri in matches {
                    let mut row = left_row.clone();
                    row.extend(right_payload.iter().map(|&i| right.rows[ri][i].clone()));
                    out.rows.push(row);
                }
            }
        }
        Ok(out)
    }
}

/// Canonical text form of a key tuple. Strings compare by content so that
/// `"2020"` and `2020` coming from different pages still align.
fn join_key(row: &[Value], indices: &[usize]) -> String {
    let mut key = String::new();
    for &i in indices {
        match &row[i] {
            Value::String(s) => key.push_str(s),
            other => key.push_str(&other.to_string()),
        }
        key.push('\u{1f}');
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Table {
        let mut t = Table::new(["area", "id", "year", "Population"]);
        t.push_row(vec![json!("Warszawa"), json!("01"), json!(2020), json!(1_790_658)]);
        t.push_row(vec![json!("Warszawa"), json!("01"), json!(2021), json!(1_792_718)]);
        t.push_row(vec![json!("Lublin"), json!("02"), json!(2020), json!(339_682)]);
        t
    }

    #[test]
    fn rename_select_drop() {
        let t = sample().renamed("Population", "Pop").unwrap();
        assert_eq!(t.columns(), ["area", "id", "year", "Pop"]);

        let t = t.select(&["year", "Pop"]).unwrap();
        assert_eq!(t.columns(), ["year", "Pop"]);
        assert_eq!(t.rows()[0], vec![json!(2020), json!(1_790_658)]);

        let t = sample().without_columns(&["id"]).unwrap();
        assert_eq!(t.columns(), ["area", "year", "Population"]);
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn missing_columns_are_errors() {
        assert_eq!(
            sample().renamed("nope", "x"),
            Err(TableError::NoSuchColumn("nope".into()))
        );
        assert!(sample().select(&["area", "nope"]).is_err());
        assert!(sample().without_columns(&["nope"]).is_err());
    }

    #[test]
    fn join_on_shared_keys() {
        let mut income = Table::new(["area", "id", "year", "Income"]);
        income.push_row(vec![json!("Warszawa"), json!("01"), json!(2020), json!(8_500)]);
        income.push_row(vec![json!("Lublin"), json!("02"), json!(2020), json!(6_100)]);

        let joined = sample()
            .inner_join(&income, &["id", "area", "year"])
            .unwrap();
        assert_eq!(joined.columns(), ["area", "id", "year", "Population", "Income"]);
        // 2021 has no income row, so only the two 2020 rows survive.
        assert_eq!(joined.len(), 2);
        assert_eq!(
            joined.column("Income").unwrap(),
            [&json!(8_500), &json!(6_100)]
        );
    }

    #[test]
    fn join_aligns_string_and_number_keys() {
        let mut left = Table::new(["id", "v"]);
        left.push_row(vec![json!("2020"), json!(1)]);
        let mut right = Table::new(["id", "w"]);
        right.push_row(vec![json!(2020), json!(2)]);

        let joined = left.inner_join(&right, &["id"]).unwrap();
        assert_eq!(joined.len(), 1);
    }

    #[test]
    fn join_suffixes_colliding_columns() {
        let mut left = Table::new(["id", "Data"]);
        left.push_row(vec![json!("a"), json!(1)]);
        let mut right = Table::new(["id", "Data"]);
        right.push_row(vec![json!("a"), json!(2)]);

        let joined = left.inner_join(&right, &["id"]).unwrap();
        assert_eq!(joined.columns(), ["id", "Data", "Data_y"]);
    }

    #[test]
    fn join_missing_key_is_error() {
        let other = Table::new(["area", "year", "Income"]);
        assert_eq!(
            sample().inner_join(&other, &["id", "area", "year"]),
            Err(TableError::NoSuchColumn("id".into()))
        );
    }
}
