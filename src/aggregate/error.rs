//! Aggregation error types

use crate::catalog::{CatalogError, SeriesField};
use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while aggregating or summarizing
#[derive(Error, Debug)]
pub enum AggregateError {
    /// Date range ends before it starts
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// Nothing to summarize
    #[error("No data to summarize")]
    EmptyInput,

    /// Rows do not carry the requested field
    #[error("Series has no '{0}' field")]
    MissingField(SeriesField),

    /// Metric or category lookup failed
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Rendering a series failed
    #[error("Format error: {0}")]
    Format(String),
}

impl From<csv::Error> for AggregateError {
    fn from(err: csv::Error) -> Self {
        AggregateError::Format(err.to_string())
    }
}

/// Result type alias for aggregation operations
pub type AggregateResult<T> = Result<T, AggregateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AggregateError::InvalidRange {
            start: NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid date range: start 2024-02-10 is after end 2024-02-01"
        );

        assert_eq!(
            AggregateError::MissingField(SeriesField::Sum).to_string(),
            "Series has no 'sum' field"
        );
    }

    #[test]
    fn test_catalog_error_is_transparent() {
        let err: AggregateError = CatalogError::UnknownMetric("foo".to_string()).into();
        assert_eq!(err.to_string(), "Unknown metric: foo");
    }
}
