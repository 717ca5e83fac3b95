//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{DailyAggregate, DateRange, Summary};
use crate::catalog::{AggregationPolicy, SeriesField};
use crate::extract::ExtractStats;

// ============================================
// CATALOG DTOs
// ============================================

/// Full metric catalog
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub categories: Vec<CategoryDto>,
    pub total_metrics: usize,
}

/// One category with its metrics
#[derive(Debug, Serialize)]
pub struct CategoryDto {
    pub name: String,
    pub metrics: Vec<MetricDto>,
}

/// Catalog entry for one metric
#[derive(Debug, Serialize)]
pub struct MetricDto {
    /// Full identifier, e.g. `HKQuantityTypeIdentifierStepCount`
    pub id: String,
    /// Display name, e.g. `StepCount`
    pub name: String,
    pub policy: AggregationPolicy,
    pub fields: Vec<SeriesField>,
    /// Observations in the dataset, when listed for an export
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observations: Option<usize>,
}

// ============================================
// EXPORT DTOs
// ============================================

/// Upload query parameters
#[derive(Debug, Default, Deserialize)]
pub struct UploadParams {
    /// Original file name, kept for display
    pub name: Option<String>,
}

/// Extracted export summary
#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub stats: ExtractStats,
    /// Earliest and latest observation dates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    /// Categories with data, in catalog order
    pub categories: Vec<String>,
}

/// Upload result
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    #[serde(flatten)]
    pub export: ExportResponse,
    /// Exports dropped to make room
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub evicted: Vec<Uuid>,
}

/// All held exports
#[derive(Debug, Serialize)]
pub struct ExportListResponse {
    pub exports: Vec<ExportResponse>,
    pub capacity: usize,
}

/// Metrics of one category present in an export
#[derive(Debug, Serialize)]
pub struct CategoryMetricsResponse {
    pub category: String,
    pub metrics: Vec<MetricDto>,
}

// ============================================
// DAILY DTOs
// ============================================

/// Daily series query parameters
#[derive(Debug, Deserialize)]
pub struct DailyParams {
    /// Metric identifier or display name
    pub metric: String,
    /// First day (inclusive), defaults to the export's first day
    pub start: Option<NaiveDate>,
    /// Last day (inclusive), defaults to the export's last day
    pub end: Option<NaiveDate>,
    /// Field to summarize, defaults to the policy's primary field
    pub field: Option<String>,
    /// Output format: json (default) or csv
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "json".to_string()
}

/// Daily series with its summary
#[derive(Debug, Serialize)]
pub struct DailyResponse {
    /// "ok" or "no_data"
    pub status: String,
    pub metric: String,
    pub name: String,
    pub category: String,
    pub policy: AggregationPolicy,
    pub fields: Vec<SeriesField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<DateRange>,
    pub rows: Vec<DailyAggregate>,
    pub summary: Option<Summary>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy, degraded
    pub status: String,
    /// Metrics in the active catalog
    pub catalog_metrics: usize,
    /// Exports held in memory
    pub datasets: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
