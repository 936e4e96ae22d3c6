//! Synchronous client for the **GUS BDL (Local Data Bank) API**.
//!
//! This module focuses on the `data/by-variable/{id}` endpoint and returns
//! results as a flat [`Table`]. Pagination is handled automatically, with a
//! bounded tolerance for transient failures: a page that times out or fails
//! at the transport level is re-requested until it succeeds or ten
//! consecutive failures accumulate, while an HTTP-level error aborts
//! pagination and keeps whatever was already fetched.
//!
//! Typical usage:
//! ```no_run
//! # use bdl_rs::{Client, VariableQuery};
//! let client = Client::default();
//! let mut query = VariableQuery::new(60270);
//! query.years = vec![2020, 2021];
//! query.column_name = "Population".into();
//! let table = client.fetch_variable(&query)?;
//! # Ok::<(), bdl_rs::Error>(())
//! ```

use crate::error::Error;
use crate::merge::merge_tables;
use crate::models::{DEFAULT_YEAR, Page, VariableQuery};
use crate::table::{Table, TableError};
use log::warn;
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use std::time::Duration;

/// Records per page, fixed by this client.
const PAGE_SIZE: u32 = 100;

/// Consecutive transport failures tolerated before pagination gives up.
const MAX_CONSECUTIVE_FAILURES: u32 = 10;

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    http: HttpClient,
}

impl Default for Client {
    fn default() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }
}

impl Client {
    /// A client with a custom total request timeout. Connect timeout and
    /// redirect policy keep their defaults (10s, 5 redirects).
    pub fn with_timeout(timeout: Duration) -> Self {
        let http = HttpClient::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .redirect(Policy::limited(5))
            .user_agent(concat!("bdl_rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("reqwest client build");
        Self {
            base_url: "https://bdl.stat.gov.pl/api/v1/data".into(),
            http,
        }
    }

    /// Fetch every page of one variable's data and shape it into a table
    /// with columns `[area, id, year, <column_name>]`.
    ///
    /// ### Errors
    /// - [`Error::MissingVariableId`] if `query.variable` is `None`
    /// - [`Error::Timeout`] / [`Error::Transport`] / [`Error::Http`] if the
    ///   first page cannot be retrieved (later pages degrade instead, see
    ///   the module docs)
    /// - [`Error::NoData`] if the API reports zero records
    ///
    /// If the response shape differs from what the column post-processing
    /// expects, the raw flattened table is returned as-is rather than
    /// failing; a warning notes the downgrade.
    pub fn fetch_variable(&self, query: &VariableQuery) -> Result<Table, Error> {
        let variable = query.variable.ok_or_else(|| {
            warn!("fetch refused: no variable id given");
            Error::MissingVariableId
        })?;

        let years = if query.years.is_empty() {
            vec![DEFAULT_YEAR]
        } else {
            query.years.clone()
        };
        let mut url = format!(
            "{}/by-variable/{}?format=json&unit-level={}",
            self.base_url, variable, query.unit_level
        );
        for year in years {
            url.push_str(&format!("&year={year}"));
        }
        url.push_str(&format!("&page-size={PAGE_SIZE}"));

        // Page 0 failure is fatal to the whole fetch.
        let first = match self.get_page(&url) {
            Ok(page) => page,
            Err(e) => {
                warn!("variable {variable}: first page failed: {e}");
                return Err(e);
            }
        };
        if first.total_records == 0 {
            warn!("variable {variable}: no records found");
            return Err(Error::NoData(variable));
        }

        let raw = collect_pages(&first, |page| self.get_page(&format!("{url}&page={page}")));

        match shape(&raw, &query.column_name) {
            Ok(table) => Ok(table),
            Err(e) => {
                warn!("variable {variable}: returning unshaped columns: {e}");
                Ok(raw)
            }
        }
    }

    /// Fetch several variables and inner-join them into one wide table.
    ///
    /// `variables` and `column_names` are parallel lists; a mismatch is a
    /// precondition failure and nothing is fetched. A variable whose fetch
    /// fails is logged and left out of the merge; the remaining tables are
    /// joined on `on` (typically `["id", "area", "year"]`) and the `drop`
    /// columns (typically `["id"]`) are removed from the final table.
    pub fn fetch_merged(
        &self,
        variables: &[u32],
        column_names: &[String],
        unit_level: u32,
        years: &[i32],
        on: &[&str],
        drop: &[&str],
    ) -> Result<Table, Error> {
        if variables.len() != column_names.len() {
            warn!(
                "fetch refused: {} variables but {} column names",
                variables.len(),
                column_names.len()
            );
            return Err(Error::NameCountMismatch {
                variables: variables.len(),
                names: column_names.len(),
            });
        }

        let mut tables = Vec::with_capacity(variables.len());
        for (variable, name) in variables.iter().zip(column_names) {
            let query = VariableQuery {
                variable: Some(*variable),
                unit_level,
                years: years.to_vec(),
                column_name: name.clone(),
            };
            match self.fetch_variable(&query) {
                Ok(table) => tables.push(table),
                Err(e) => warn!("could not retrieve data for variable {variable}: {e}"),
            }
        }

        merge_tables(&tables, on, drop)
    }

    /// GET one page and decode it. Non-success statuses become
    /// [`Error::Http`]; timeouts and other transport problems keep their
    /// own variants so the pagination loop can treat them differently.
    fn get_page(&self, url: &str) -> Result<Page, Error> {
        let resp = self.http.get(url).send().map_err(Error::from_reqwest)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Http(status.as_u16()));
        }
        resp.json::<Page>().map_err(Error::from_reqwest)
    }
}

/// Walk pages 1..ceil(totalRecords / PAGE_SIZE), accumulating flattened rows
/// onto the first page's.
///
/// A failed page is not skipped: the loop re-requests the same index until
/// it succeeds or `MAX_CONSECUTIVE_FAILURES` failures accumulate without an
/// intervening success. An HTTP status error aborts immediately. Either way
/// the rows gathered so far are kept.
fn collect_pages<F>(first: &Page, mut get_page: F) -> Table
where
    F: FnMut(u32) -> Result<Page, Error>,
{
    let pages = first.total_records.div_ceil(PAGE_SIZE);
    let mut table = Page::empty_table();
    first.append_rows(&mut table);

    let mut page = 1;
    let mut failures = 0;
    while page < pages {
        match get_page(page) {
            Ok(p) => {
                p.append_rows(&mut table);
                page += 1;
                failures = 0;
            }
            Err(e @ Error::Http(_)) => {
                warn!("page {page}: {e}; aborting pagination");
                break;
            }
            Err(e) => {
                failures += 1;
                warn!("page {page}: {e} (consecutive failures: {failures})");
            }
        }
        if failures == MAX_CONSECUTIVE_FAILURES {
            warn!("giving up pagination after {failures} consecutive failures");
            break;
        }
    }
    table
}

/// Post-process a raw flattened table into its canonical shape: drop the
/// `attrId` helper column, rename `name`/`val`, and reorder.
fn shape(raw: &Table, column_name: &str) -> Result<Table, TableError> {
    raw.without_columns(&["attrId"])?
        .renamed("name", "area")?
        .renamed("val", column_name)?
        .select(&["area", "id", "year", column_name])
}
