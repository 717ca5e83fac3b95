//! Catalog error types
//!
//! Lookup failures and construction-time misconfiguration.

use thiserror::Error;

/// Errors that can occur while building or querying a metric catalog
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Metric identifier is not part of the catalog
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// Category name is not part of the catalog
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// The same metric was listed under two categories
    #[error("Metric {metric} listed in both '{first}' and '{second}'")]
    DuplicateMetric {
        metric: String,
        first: String,
        second: String,
    },

    /// The same category name was declared twice
    #[error("Category declared twice: {0}")]
    DuplicateCategory(String),

    /// A category was declared without any metrics
    #[error("Category has no metrics: {0}")]
    EmptyCategory(String),

    /// Catalog file could not be read or parsed
    #[error("Invalid catalog file: {0}")]
    InvalidFile(String),
}

/// Result type alias for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
