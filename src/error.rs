use thiserror::Error;

use crate::table::TableError;

/// Failures reported by the fetch and merge pipeline.
///
/// The BDL helpers never panic and never bubble a raw transport error through
/// an unrelated code path; every failure surfaces as one of these variants.
/// Callers check the tag instead of probing for an empty table.
#[derive(Debug, Error)]
pub enum Error {
    /// A variable id is required before anything can be fetched.
    #[error("a variable id is required")]
    MissingVariableId,

    /// `fetch_merged` was given differently sized id/name lists.
    #[error("number of column names ({names}) must match number of variables ({variables})")]
    NameCountMismatch { variables: usize, names: usize },

    /// The API knows the variable but holds no records for the query.
    #[error("no records found for variable {0}")]
    NoData(u32),

    /// The server answered with a non-success HTTP status.
    #[error("request failed with HTTP {0}")]
    Http(u16),

    /// The request timed out.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Connection failure, decode failure, or any other transport problem.
    #[error("request failed: {0}")]
    Transport(String),

    /// Joining the per-variable tables failed.
    #[error("could not merge tables: {0}")]
    Merge(#[source] TableError),
}

impl Error {
    /// Classify a `reqwest` error into the retry taxonomy.
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout(e.to_string())
        } else {
            Error::Transport(e.to_string())
        }
    }
}
