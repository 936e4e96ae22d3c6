use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::table::Table;

/// Default year requested when the caller supplies none.
pub const DEFAULT_YEAR: i32 = 2020;

/// Parameters identifying one statistic series to fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableQuery {
    /// BDL variable id (e.g. 60270 for population). Required; `None` is a
    /// precondition failure reported by the fetch.
    pub variable: Option<u32>,
    /// Granularity of the administrative unit the data is reported for.
    pub unit_level: u32,
    /// Years of validity. Empty means `[DEFAULT_YEAR]`.
    pub years: Vec<i32>,
    /// Name for the value column in the resulting table.
    pub column_name: String,
}

impl Default for VariableQuery {
    fn default() -> Self {
        Self {
            variable: None,
            unit_level: 5,
            years: Vec::new(),
            column_name: "Data".into(),
        }
    }
}

impl VariableQuery {
    pub fn new(variable: u32) -> Self {
        Self {
            variable: Some(variable),
            ..Self::default()
        }
    }
}

/// One page of a `by-variable` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub total_records: u32,
    #[serde(default)]
    pub results: Vec<UnitRecord>,
}

/// One administrative unit's record within a page.
#[derive(Debug, Clone, Deserialize)]
pub struct UnitRecord {
    /// Unit id. Some endpoints serialize this as a number; accept both.
    #[serde(deserialize_with = "de_string_from_string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub values: Vec<Observation>,
}

/// A single observation inside a unit record.
#[derive(Debug, Clone, Deserialize)]
pub struct Observation {
    /// Observed value; kept as raw JSON since it may be a number or null.
    #[serde(default)]
    pub val: Value,
    /// The API encodes `year` as a string ("2020"); accept both forms.
    #[serde(deserialize_with = "de_i32_from_string_or_number")]
    pub year: i32,
    #[serde(rename = "attrId", default)]
    pub attr_id: Value,
}

/// Column layout of a freshly flattened page: observation fields first,
/// then the parent record's metadata.
pub const RAW_COLUMNS: [&str; 5] = ["val", "year", "attrId", "id", "name"];

impl Page {
    /// An empty table with the raw flattened column layout.
    pub fn empty_table() -> Table {
        Table::new(RAW_COLUMNS)
    }

    /// Flatten this page into `table`, one row per observation, carrying the
    /// parent record's `id` and `name` along as metadata columns.
    pub fn append_rows(&self, table: &mut Table) {
        for record in &self.results {
            for obs in &record.values {
                table.push_row(vec![
                    obs.val.clone(),
                    Value::from(obs.year),
                    obs.attr_id.clone(),
                    Value::String(record.id.clone()),
                    Value::String(record.name.clone()),
                ]);
            }
        }
    }
}

/// Serde helper: parse `i32` from either a JSON number or a string.
fn de_i32_from_string_or_number<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct I32Visitor;

    impl<'de> Visitor<'de> for I32Visitor {
        type Value = i32;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a string or integer")
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            i32::try_from(v).map_err(E::custom)
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            i32::try_from(v).map_err(E::custom)
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            s.parse::<i32>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(I32Visitor)
}

/// Serde helper: accept a string as-is, or render a number to a string.
fn de_string_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct StringVisitor;

    impl<'de> Visitor<'de> for StringVisitor {
        type Value = String;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a string or number")
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(s.to_string())
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v.to_string())
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(StringVisitor)
}
