//! Summary Reducer
//!
//! Reduces one field of a daily series to mean, max and min across days.
//! Every day weighs the same regardless of how many observations fed it.

use crate::aggregate::daily::{DailyAggregate, DailySeries};
use crate::aggregate::error::{AggregateError, AggregateResult};
use crate::catalog::SeriesField;
use serde::Serialize;

/// Mean, max and min of one field across days
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub field: SeriesField,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    pub days: usize,
}

impl Summary {
    /// Render the three headline values with one decimal place
    pub fn display_values(&self) -> [(&'static str, String); 3] {
        [
            ("Average", format!("{:.1}", self.mean)),
            ("Maximum", format!("{:.1}", self.max)),
            ("Minimum", format!("{:.1}", self.min)),
        ]
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} over {} days: avg {:.1}, max {:.1}, min {:.1}",
            self.field, self.days, self.mean, self.max, self.min
        )
    }
}

/// Summarize `field` over `rows`
pub fn summarize(rows: &[DailyAggregate], field: SeriesField) -> AggregateResult<Summary> {
    if rows.is_empty() {
        return Err(AggregateError::EmptyInput);
    }

    let values = rows
        .iter()
        .map(|row| row.get(field).ok_or(AggregateError::MissingField(field)))
        .collect::<AggregateResult<Vec<f64>>>()?;

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);

    Ok(Summary {
        field,
        mean,
        max,
        min,
        days: values.len(),
    })
}

impl DailySeries {
    /// Summarize the policy's primary field (sum for totals, mean otherwise)
    pub fn summary(&self) -> AggregateResult<Summary> {
        summarize(&self.rows, self.policy.primary_field())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::daily::DailyValues;
    use chrono::NaiveDate;

    fn sum_rows(values: &[f64]) -> Vec<DailyAggregate> {
        values
            .iter()
            .enumerate()
            .map(|(i, &sum)| DailyAggregate {
                date: NaiveDate::from_ymd_opt(2024, 2, 1 + i as u32).unwrap(),
                values: DailyValues::Sum { sum },
            })
            .collect()
    }

    #[test]
    fn test_summarize_sums() {
        let rows = sum_rows(&[3000.0, 5000.0, 4000.0]);
        let summary = summarize(&rows, SeriesField::Sum).unwrap();

        assert_eq!(summary.mean, 4000.0);
        assert_eq!(summary.max, 5000.0);
        assert_eq!(summary.min, 3000.0);
        assert_eq!(summary.days, 3);
        assert!(summary.min <= summary.mean && summary.mean <= summary.max);
    }

    #[test]
    fn test_single_row() {
        let rows = sum_rows(&[42.0]);
        let summary = summarize(&rows, SeriesField::Sum).unwrap();
        assert_eq!((summary.mean, summary.max, summary.min), (42.0, 42.0, 42.0));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            summarize(&[], SeriesField::Mean),
            Err(AggregateError::EmptyInput)
        ));
    }

    #[test]
    fn test_missing_field() {
        let rows = sum_rows(&[1.0]);
        assert!(matches!(
            summarize(&rows, SeriesField::Mean),
            Err(AggregateError::MissingField(SeriesField::Mean))
        ));
    }

    #[test]
    fn test_days_weigh_equally() {
        // Day means, not observation means
        let rows = vec![
            DailyAggregate {
                date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                values: DailyValues::MeanMinMax {
                    mean: 60.0,
                    min: 50.0,
                    max: 70.0,
                },
            },
            DailyAggregate {
                date: NaiveDate::from_ymd_opt(2024, 2, 2).unwrap(),
                values: DailyValues::MeanMinMax {
                    mean: 80.0,
                    min: 80.0,
                    max: 80.0,
                },
            },
        ];

        let summary = summarize(&rows, SeriesField::Mean).unwrap();
        assert_eq!(summary.mean, 70.0);

        let band_max = summarize(&rows, SeriesField::Max).unwrap();
        assert_eq!(band_max.max, 80.0);
        assert_eq!(band_max.min, 70.0);
    }

    #[test]
    fn test_display_values() {
        let summary = Summary {
            field: SeriesField::Mean,
            mean: 70.25,
            max: 80.0,
            min: 60.04,
            days: 2,
        };
        assert_eq!(
            summary.display_values(),
            [
                ("Average", "70.2".to_string()),
                ("Maximum", "80.0".to_string()),
                ("Minimum", "60.0".to_string()),
            ]
        );
    }
}
