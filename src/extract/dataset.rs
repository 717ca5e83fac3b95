//! Extracted dataset
//!
//! The read-only result of one extraction pass. Aggregation runs against it
//! as many times as the caller likes without re-reading the export.

use crate::catalog::{CatalogResult, MetricCatalog};
use crate::extract::observation::Observation;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

/// Counters for records seen during extraction
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ExtractStats {
    /// `Record` elements encountered
    pub records_seen: usize,
    /// Records kept as observations
    pub observations: usize,
    /// Records whose type is missing or not in the catalog
    pub unrecognized: usize,
    /// Recognized records with a missing, non-numeric or non-finite value
    pub invalid_value: usize,
    /// Recognized records with a missing or unparseable start date
    pub invalid_timestamp: usize,
}

impl ExtractStats {
    /// Total records dropped for any reason
    pub fn skipped(&self) -> usize {
        self.unrecognized + self.invalid_value + self.invalid_timestamp
    }
}

impl std::fmt::Display for ExtractStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} records, {} observations, {} skipped ({} unrecognized, {} bad value, {} bad date)",
            self.records_seen,
            self.observations,
            self.skipped(),
            self.unrecognized,
            self.invalid_value,
            self.invalid_timestamp
        )
    }
}

/// Observations extracted from one export, in document order
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    observations: Vec<Observation>,
    stats: ExtractStats,
}

impl Dataset {
    pub(crate) fn new(observations: Vec<Observation>, stats: ExtractStats) -> Self {
        Self {
            observations,
            stats,
        }
    }

    /// Build a dataset from observations produced elsewhere
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        let stats = ExtractStats {
            records_seen: observations.len(),
            observations: observations.len(),
            ..Default::default()
        };
        Self::new(observations, stats)
    }

    /// All observations
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Diagnostic counters from the extraction pass
    pub fn extract_stats(&self) -> ExtractStats {
        self.stats
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Check if nothing was extracted
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Earliest and latest observation dates, the default filter range
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.observations.iter().map(Observation::date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// Date bounds of a single metric
    pub fn metric_date_bounds(&self, metric_id: &str) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self
            .observations
            .iter()
            .filter(|o| o.metric_id == metric_id)
            .map(Observation::date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// Number of observations of a metric
    pub fn count_for(&self, metric_id: &str) -> usize {
        self.observations
            .iter()
            .filter(|o| o.metric_id == metric_id)
            .count()
    }

    /// Categories with at least one observation, in catalog order
    pub fn categories_present<'c>(&self, catalog: &'c MetricCatalog) -> Vec<&'c str> {
        let present: HashSet<&str> = self
            .observations
            .iter()
            .map(|o| o.category.as_str())
            .collect();

        catalog
            .category_names()
            .filter(|name| present.contains(name))
            .collect()
    }

    /// Metrics of `category` that occur in this dataset, in catalog order
    pub fn metrics_available<'c>(
        &self,
        catalog: &'c MetricCatalog,
        category: &str,
    ) -> CatalogResult<Vec<&'c str>> {
        let metrics = catalog.metrics_in(category)?;
        let present = self.metric_set();

        Ok(metrics
            .iter()
            .map(String::as_str)
            .filter(|m| present.contains(m))
            .collect())
    }

    fn metric_set(&self) -> HashSet<&str> {
        self.observations
            .iter()
            .map(|o| o.metric_id.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::observation::parse_start_date;

    fn obs(metric: &str, category: &str, value: f64, ts: &str) -> Observation {
        Observation {
            metric_id: metric.to_string(),
            value,
            unit: String::new(),
            timestamp: parse_start_date(ts).unwrap(),
            category: category.to_string(),
        }
    }

    fn sample() -> Dataset {
        Dataset::from_observations(vec![
            obs(
                "HKQuantityTypeIdentifierBodyMass",
                "Body Measurements",
                70.0,
                "2024-02-03 08:00:00 +0000",
            ),
            obs(
                "HKQuantityTypeIdentifierStepCount",
                "Activity",
                500.0,
                "2024-01-28 10:00:00 +0000",
            ),
            obs(
                "HKQuantityTypeIdentifierStepCount",
                "Activity",
                800.0,
                "2024-02-10 18:00:00 +0000",
            ),
        ])
    }

    #[test]
    fn test_date_bounds() {
        let dataset = sample();
        let (lo, hi) = dataset.date_bounds().unwrap();
        assert_eq!(lo, NaiveDate::from_ymd_opt(2024, 1, 28).unwrap());
        assert_eq!(hi, NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());

        let (lo, hi) = dataset
            .metric_date_bounds("HKQuantityTypeIdentifierBodyMass")
            .unwrap();
        assert_eq!(lo, hi);

        assert!(Dataset::default().date_bounds().is_none());
    }

    #[test]
    fn test_categories_present_in_catalog_order() {
        let catalog = MetricCatalog::healthkit();
        let dataset = sample();
        assert_eq!(
            dataset.categories_present(catalog),
            vec!["Activity", "Body Measurements"]
        );
    }

    #[test]
    fn test_metrics_available() {
        let catalog = MetricCatalog::healthkit();
        let dataset = sample();

        assert_eq!(
            dataset.metrics_available(catalog, "Activity").unwrap(),
            vec!["HKQuantityTypeIdentifierStepCount"]
        );
        assert!(dataset
            .metrics_available(catalog, "Sleep")
            .unwrap()
            .is_empty());
        assert!(dataset.metrics_available(catalog, "Workouts").is_err());
    }

    #[test]
    fn test_count_for() {
        let dataset = sample();
        assert_eq!(dataset.count_for("HKQuantityTypeIdentifierStepCount"), 2);
        assert_eq!(dataset.count_for("HKQuantityTypeIdentifierHeartRate"), 0);
        assert_eq!(dataset.len(), 3);
    }

    #[test]
    fn test_stats_display() {
        let stats = ExtractStats {
            records_seen: 10,
            observations: 6,
            unrecognized: 2,
            invalid_value: 1,
            invalid_timestamp: 1,
        };
        assert_eq!(stats.skipped(), 4);
        assert_eq!(
            stats.to_string(),
            "10 records, 6 observations, 4 skipped (2 unrecognized, 1 bad value, 1 bad date)"
        );
    }
}
