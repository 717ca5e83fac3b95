//! Series rendering for downloads and terminal output

use crate::aggregate::daily::{DailyAggregate, DailySeries};
use crate::aggregate::error::{AggregateError, AggregateResult};
use crate::catalog::{AggregationPolicy, SeriesField};

/// Render a series as CSV with a `date` column followed by the policy's fields
pub fn to_csv(series: &DailySeries) -> AggregateResult<String> {
    write_csv(series.fields(), &series.rows)
}

/// Header-only CSV for a metric with nothing to aggregate
pub fn empty_csv(policy: AggregationPolicy) -> AggregateResult<String> {
    write_csv(policy.fields(), &[])
}

fn write_csv(fields: &[SeriesField], rows: &[DailyAggregate]) -> AggregateResult<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["date"];
    header.extend(fields.iter().map(|f| f.name()));
    wtr.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.date.to_string()];
        for field in fields {
            record.push(row.get(*field).map(|v| v.to_string()).unwrap_or_default());
        }
        wtr.write_record(&record)?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| AggregateError::Format(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| AggregateError::Format(e.to_string()))
}

/// Suggested download file name, e.g. `StepCount_2024-02-01_2024-02-29.csv`
pub fn csv_file_name(series: &DailySeries) -> String {
    format!(
        "{}_{}_{}.csv",
        crate::catalog::display_name(&series.metric_id),
        series.range.start,
        series.range.end
    )
}
