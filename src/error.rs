use std::path::PathBuf;
use thiserror::Error;

use crate::query::View;

/// Errors raised by a [`Reader`](crate::reader::Reader) implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open store at {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("store query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("unexpected value in column {column}: expected {expected}, found {found}")]
    Decode {
        column: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

/// Errors surfaced by the query layer and the dashboard boundary
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("schema error: {0}")]
    Schema(String),

    #[error("unknown indicator: {0:?}")]
    UnknownIndicator(String),

    #[error("indicator {indicator:?} has no values in any year")]
    EmptyDomain { indicator: String },

    #[error("year {year} has no data for indicator {indicator:?}")]
    YearOutOfDomain { indicator: String, year: i32 },

    #[error("not enough data for the {view} view ({detail})")]
    InsufficientData { view: View, detail: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl QueryError {
    /// Whether this error ends the session rather than degrading one chart
    pub fn is_fatal(&self) -> bool {
        match self {
            QueryError::Schema(_) | QueryError::UnknownIndicator(_) => true,
            QueryError::Store(StoreError::Open { .. }) => true,
            QueryError::Store(_) => false,
            QueryError::EmptyDomain { .. }
            | QueryError::YearOutOfDomain { .. }
            | QueryError::InsufficientData { .. } => false,
        }
    }

    pub(crate) fn schema(message: impl Into<String>) -> Self {
        QueryError::Schema(message.into())
    }
}

pub type Result<T, E = QueryError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(QueryError::schema("missing table").is_fatal());
        assert!(QueryError::UnknownIndicator("x".into()).is_fatal());
        assert!(!QueryError::EmptyDomain {
            indicator: "x".into()
        }
        .is_fatal());

        let exec = QueryError::Store(StoreError::Sqlite(rusqlite::Error::InvalidQuery));
        assert!(!exec.is_fatal());

        let open = QueryError::Store(StoreError::Open {
            path: PathBuf::from("missing.sqlite"),
            source: rusqlite::Error::InvalidQuery,
        });
        assert!(open.is_fatal());
    }

    #[test]
    fn test_insufficient_data_message() {
        let err = QueryError::InsufficientData {
            view: View::Scatter,
            detail: "no municipality has both values in 2023".into(),
        };
        assert_eq!(
            err.to_string(),
            "not enough data for the scatter view (no municipality has both values in 2023)"
        );
    }
}
