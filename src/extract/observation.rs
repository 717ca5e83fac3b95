//! Observation type and attribute coercion
//!
//! An [`Observation`] is one `Record` element that passed every check: a
//! recognized type, a finite numeric value and a parseable start date.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;

/// Timestamp layout used by Apple Health exports, e.g. `2024-01-15 10:30:00 -0500`
pub const START_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// One decoded, validated measurement
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Observation {
    /// Recognized metric identifier
    pub metric_id: String,
    /// Finite measured value
    pub value: f64,
    /// Unit as written in the export (empty when absent)
    pub unit: String,
    /// Start of the measurement, in the record's own UTC offset
    pub timestamp: DateTime<FixedOffset>,
    /// Category resolved from the catalog
    pub category: String,
}

impl Observation {
    /// Calendar date of the measurement in its recorded offset
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Parse a `value` attribute, rejecting NaN and infinities
pub fn parse_value(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a `startDate` attribute in [`START_DATE_FORMAT`]
pub fn parse_start_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(raw, START_DATE_FORMAT).ok()
}
