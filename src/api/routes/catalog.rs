//! Catalog Routes
//!
//! - GET /api/v1/catalog - Categories and metrics with their policies

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{CatalogResponse, CategoryDto, MetricDto};
use crate::api::state::AppState;
use crate::catalog::{display_name, MetricCatalog};

/// GET /api/v1/catalog
pub async fn get_catalog(State(state): State<Arc<AppState>>) -> Json<CatalogResponse> {
    let categories = state
        .catalog
        .categories()
        .iter()
        .map(|category| CategoryDto {
            name: category.name.clone(),
            metrics: category
                .metrics
                .iter()
                .filter_map(|id| metric_dto(&state.catalog, id, None))
                .collect(),
        })
        .collect();

    Json(CatalogResponse {
        categories,
        total_metrics: state.catalog.len(),
    })
}

/// Describe one catalog metric
pub(crate) fn metric_dto(
    catalog: &MetricCatalog,
    metric_id: &str,
    observations: Option<usize>,
) -> Option<MetricDto> {
    let policy = catalog.policy_of(metric_id).ok()?;
    Some(MetricDto {
        id: metric_id.to_string(),
        name: display_name(metric_id).to_string(),
        policy,
        fields: policy.fields().to_vec(),
        observations,
    })
}
