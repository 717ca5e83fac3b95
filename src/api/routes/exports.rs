//! Export Routes
//!
//! Upload an Apple Health export once, then query it repeatedly.
//!
//! - POST /api/v1/exports - Upload `export.zip` or `export.xml` as the raw body
//! - GET /api/v1/exports - List held exports
//! - GET /api/v1/exports/:id - Export summary
//! - DELETE /api/v1/exports/:id - Drop an export
//! - GET /api/v1/exports/:id/categories/:category/metrics - Metrics with data

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::dto::{
    CategoryMetricsResponse, ExportListResponse, ExportResponse, UploadParams, UploadResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::catalog::metric_dto;
use crate::api::state::{AppState, StoredDataset};
use crate::aggregate::DateRange;
use crate::catalog::MetricCatalog;
use crate::extract::RecordExtractor;

/// POST /api/v1/exports
///
/// Extracts on a blocking thread; the body limit is `max_upload_mb`.
pub async fn upload_export(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UploadParams>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(format!(
                "upload limit is {} MB",
                state.config.max_upload_mb
            ))
        } else {
            ApiError::Validation(rejection.body_text())
        }
    })?;
    if body.is_empty() {
        return Err(ApiError::Validation("Request body is empty".to_string()));
    }

    let catalog = Arc::clone(&state.catalog);
    let size = body.len();
    let dataset = tokio::task::spawn_blocking(move || {
        RecordExtractor::new(&catalog).extract_bytes(&body)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Extraction task failed: {}", e)))??;

    let (stored, evicted) = state.datasets.insert(params.name, dataset).await;

    tracing::info!(
        id = %stored.id,
        bytes = size,
        observations = stored.dataset.len(),
        evicted = evicted.len(),
        "Export extracted"
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            export: export_response(&stored, &state.catalog),
            evicted,
        }),
    ))
}

/// GET /api/v1/exports
pub async fn list_exports(State(state): State<Arc<AppState>>) -> Json<ExportListResponse> {
    let exports = state
        .datasets
        .list()
        .await
        .iter()
        .map(|stored| export_response(stored, &state.catalog))
        .collect();

    Json(ExportListResponse {
        exports,
        capacity: state.datasets.capacity(),
    })
}

/// GET /api/v1/exports/:id
pub async fn get_export(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ExportResponse>> {
    let stored = find_export(&state, &id).await?;
    Ok(Json(export_response(&stored, &state.catalog)))
}

/// DELETE /api/v1/exports/:id
pub async fn delete_export(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if state.datasets.remove(&id).await {
        tracing::info!(id = %id, "Export dropped");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Export '{}'", id)))
    }
}

/// GET /api/v1/exports/:id/categories/:category/metrics
pub async fn category_metrics(
    State(state): State<Arc<AppState>>,
    Path((id, category)): Path<(Uuid, String)>,
) -> ApiResult<Json<CategoryMetricsResponse>> {
    let stored = find_export(&state, &id).await?;
    let available = stored.dataset.metrics_available(&state.catalog, &category)?;

    let metrics = available
        .into_iter()
        .filter_map(|metric| {
            metric_dto(&state.catalog, metric, Some(stored.dataset.count_for(metric)))
        })
        .collect();

    Ok(Json(CategoryMetricsResponse { category, metrics }))
}

/// Look up a held export
pub(crate) async fn find_export(state: &AppState, id: &Uuid) -> ApiResult<Arc<StoredDataset>> {
    state
        .datasets
        .get(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Export '{}'", id)))
}

fn export_response(stored: &StoredDataset, catalog: &MetricCatalog) -> ExportResponse {
    ExportResponse {
        id: stored.id,
        name: stored.name.clone(),
        uploaded_at: stored.uploaded_at,
        stats: stored.dataset.extract_stats(),
        date_range: stored
            .dataset
            .date_bounds()
            .map(|(start, end)| DateRange { start, end }),
        categories: stored
            .dataset
            .categories_present(catalog)
            .into_iter()
            .map(str::to_string)
            .collect(),
    }
}
