//! bdl-rs
//!
//! A lightweight Rust library for retrieving statistical data from the GUS
//! BDL (Local Data Bank) API, flattening the paged JSON responses into
//! tables, and merging several variables into one wide table keyed by
//! area and year.
//!
//! ### Features
//! - Fetch one variable across administrative units and years, with
//!   automatic pagination and a bounded tolerance for transient failures
//! - Shape responses into a tidy `[area, id, year, <name>]` table
//! - Fetch and inner-join several variables into `[area, year, <names>…]`
//!
//! ### Example
//! ```no_run
//! use bdl_rs::Client;
//!
//! let client = Client::default();
//! // Population and average income for 2020-2021, joined per (area, year).
//! let table = client.fetch_merged(
//!     &[60270, 72305],
//!     &["Population".into(), "Income".into()],
//!     5,
//!     &[2020, 2021],
//!     bdl_rs::merge::JOIN_KEYS,
//!     bdl_rs::merge::DROP_AFTER_MERGE,
//! )?;
//! println!("{} rows", table.len());
//! # Ok::<(), bdl_rs::Error>(())
//! ```
//!
//! Failures never panic and never escape as transport exceptions: every
//! fallible operation returns a tagged [`Error`], and recoverable problems
//! (a transient page failure, an unexpected column layout) degrade to
//! partial or unshaped data with a `log` warning.

pub mod api;
pub mod error;
pub mod merge;
pub mod models;
pub mod table;

pub use api::Client;
pub use error::Error;
pub use models::{Page, VariableQuery};
pub use table::{Table, TableError};
