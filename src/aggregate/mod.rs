//! Daily aggregation and summaries
//!
//! - **daily**: Per-metric calendar-date buckets combined by policy
//! - **summary**: Mean, max and min of one field across days
//! - **format**: CSV rendering
//! - **error**: Error types

pub mod daily;
pub mod error;
pub mod format;
pub mod summary;

pub use daily::{aggregate_daily, DailyAggregate, DailyAggregator, DailySeries, DailyValues, DateRange};
pub use error::{AggregateError, AggregateResult};
pub use format::{csv_file_name, empty_csv, to_csv};
pub use summary::{summarize, Summary};
