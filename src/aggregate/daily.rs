//! Daily Aggregator
//!
//! Filters observations to one metric and an inclusive date range, buckets
//! them by calendar date and combines each bucket with the metric's policy.
//!
//! ```text
//! Observations → Filter(metric, range) → Group(date) → Combine(policy) → Rows
//! ```
//!
//! Days without observations produce no row.

use crate::aggregate::error::{AggregateError, AggregateResult};
use crate::catalog::{AggregationPolicy, MetricCatalog, SeriesField};
use crate::extract::Observation;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> AggregateResult<Self> {
        if start > end {
            return Err(AggregateError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Check if a date falls within this range (both bounds inclusive)
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Values of one daily row, shaped by policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DailyValues {
    MeanMinMax { mean: f64, min: f64, max: f64 },
    Sum { sum: f64 },
    Mean { mean: f64 },
}

impl DailyValues {
    /// Combine one day's values under `policy`
    pub fn combine(policy: AggregationPolicy, values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let sum: f64 = values.iter().sum();
        let mean = sum / values.len() as f64;

        Some(match policy {
            AggregationPolicy::Mean => Self::Mean { mean },
            AggregationPolicy::Sum => Self::Sum { sum },
            AggregationPolicy::MeanMinMax => Self::MeanMinMax {
                mean,
                min: values.iter().cloned().fold(f64::INFINITY, f64::min),
                max: values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            },
        })
    }

    /// Get a field, if this row carries it
    pub fn get(&self, field: SeriesField) -> Option<f64> {
        match (*self, field) {
            (Self::Mean { mean }, SeriesField::Mean) => Some(mean),
            (Self::Sum { sum }, SeriesField::Sum) => Some(sum),
            (Self::MeanMinMax { mean, .. }, SeriesField::Mean) => Some(mean),
            (Self::MeanMinMax { min, .. }, SeriesField::Min) => Some(min),
            (Self::MeanMinMax { max, .. }, SeriesField::Max) => Some(max),
            _ => None,
        }
    }
}

/// One calendar-date row for a single metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub values: DailyValues,
}

impl DailyAggregate {
    /// Get a field by name
    pub fn get(&self, field: SeriesField) -> Option<f64> {
        self.values.get(field)
    }
}

/// Aggregated daily series for one metric
#[derive(Debug, Clone, Serialize)]
pub struct DailySeries {
    pub metric_id: String,
    pub category: String,
    pub policy: AggregationPolicy,
    pub range: DateRange,
    /// Rows ascending by date
    pub rows: Vec<DailyAggregate>,
}

impl DailySeries {
    /// Fields every row carries, in display order
    pub fn fields(&self) -> &'static [SeriesField] {
        self.policy.fields()
    }

    /// Number of days with data
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no observation matched; a displayable "no data" state
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Aggregate one metric's observations into daily rows
///
/// Fails with [`AggregateError::InvalidRange`] before looking at any
/// observation if `start > end`. An empty result is not an error.
pub fn aggregate_daily(
    observations: &[Observation],
    metric_id: &str,
    policy: AggregationPolicy,
    start: NaiveDate,
    end: NaiveDate,
) -> AggregateResult<Vec<DailyAggregate>> {
    let range = DateRange::new(start, end)?;

    let mut groups: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for obs in observations.iter().filter(|o| o.metric_id == metric_id) {
        let date = obs.date();
        if range.contains(date) {
            groups.entry(date).or_default().push(obs.value);
        }
    }

    // BTreeMap iteration is already ascending by date
    Ok(groups
        .into_iter()
        .filter_map(|(date, values)| {
            DailyValues::combine(policy, &values).map(|values| DailyAggregate { date, values })
        })
        .collect())
}

/// Aggregator resolving metric policies from a catalog
#[derive(Debug, Clone, Copy)]
pub struct DailyAggregator<'a> {
    catalog: &'a MetricCatalog,
}

impl<'a> DailyAggregator<'a> {
    /// Create an aggregator over `catalog`
    pub fn new(catalog: &'a MetricCatalog) -> Self {
        Self { catalog }
    }

    /// Build the daily series of `metric_id` within `[start, end]`
    pub fn aggregate(
        &self,
        observations: &[Observation],
        metric_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AggregateResult<DailySeries> {
        let range = DateRange::new(start, end)?;
        let policy = self.catalog.policy_of(metric_id)?;
        let category = self.catalog.category_of(metric_id)?.to_string();

        let rows = aggregate_daily(observations, metric_id, policy, start, end)?;

        tracing::debug!(
            metric = %metric_id,
            policy = %policy,
            range = %range,
            days = rows.len(),
            "Aggregated daily series"
        );

        Ok(DailySeries {
            metric_id: metric_id.to_string(),
            category,
            policy,
            range,
            rows,
        })
    }
}
