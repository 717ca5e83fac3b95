//! Daily Series Routes
//!
//! - GET /api/v1/exports/:id/daily?metric=&start=&end=&field=&format=json|csv

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::aggregate::{
    csv_file_name, empty_csv, summarize, to_csv, DailyAggregator, DailySeries,
};
use crate::api::dto::{DailyParams, DailyResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::exports::find_export;
use crate::api::state::AppState;
use crate::catalog::{display_name, SeriesField};

/// GET /api/v1/exports/:id/daily
///
/// Missing `start`/`end` default to the first and last day of the export.
/// A range without observations of the metric yields `status: "no_data"`.
pub async fn daily_series(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(params): Query<DailyParams>,
) -> ApiResult<Response> {
    let format = params.format.to_lowercase();
    if format != "json" && format != "csv" {
        return Err(ApiError::Validation(format!(
            "Unsupported format '{}', expected json or csv",
            params.format
        )));
    }

    let field = params
        .field
        .as_deref()
        .map(|f| {
            SeriesField::from_str(f)
                .ok_or_else(|| ApiError::Validation(format!("Unknown field '{}'", f)))
        })
        .transpose()?;

    let stored = find_export(&state, &id).await?;
    let metric = state.catalog.resolve(&params.metric)?.to_string();
    let policy = state.catalog.policy_of(&metric)?;
    let field = match field {
        Some(field) if !policy.fields().contains(&field) => {
            return Err(ApiError::Validation(format!(
                "Field '{}' is not produced by the {} policy",
                field, policy
            )));
        }
        Some(field) => field,
        None => policy.primary_field(),
    };

    let bounds = stored.dataset.date_bounds();
    let start = params.start.or(bounds.map(|b| b.0));
    let end = params.end.or(bounds.map(|b| b.1));

    let series = match (start, end) {
        (Some(start), Some(end)) => {
            let catalog = Arc::clone(&state.catalog);
            let dataset = Arc::clone(&stored.dataset);
            let metric = metric.clone();
            let series = tokio::task::spawn_blocking(move || {
                DailyAggregator::new(&catalog).aggregate(
                    dataset.observations(),
                    &metric,
                    start,
                    end,
                )
            })
            .await
            .map_err(|e| ApiError::Internal(format!("Aggregation task failed: {}", e)))??;
            Some(series)
        }
        _ => None,
    };

    if format == "csv" {
        return match series {
            Some(series) => csv_response(to_csv(&series)?, csv_file_name(&series)),
            None => csv_response(
                empty_csv(policy)?,
                format!("{}.csv", display_name(&metric)),
            ),
        };
    }

    let response = match series {
        Some(series) => series_response(series, field)?,
        None => DailyResponse {
            status: "no_data".to_string(),
            name: display_name(&metric).to_string(),
            category: state.catalog.category_of(&metric)?.to_string(),
            policy,
            fields: policy.fields().to_vec(),
            metric,
            range: None,
            rows: Vec::new(),
            summary: None,
        },
    };

    Ok(Json(response).into_response())
}

fn series_response(series: DailySeries, field: SeriesField) -> ApiResult<DailyResponse> {
    let summary = if series.is_empty() {
        None
    } else {
        Some(summarize(&series.rows, field)?)
    };

    Ok(DailyResponse {
        status: if summary.is_some() { "ok" } else { "no_data" }.to_string(),
        name: display_name(&series.metric_id).to_string(),
        fields: series.fields().to_vec(),
        metric: series.metric_id,
        category: series.category,
        policy: series.policy,
        range: Some(series.range),
        rows: series.rows,
        summary,
    })
}

fn csv_response(body: String, filename: String) -> ApiResult<Response> {
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Body::from(body),
    )
        .into_response())
}
