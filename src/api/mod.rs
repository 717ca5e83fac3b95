//! Vitalog REST API
//!
//! HTTP API layer for Vitalog, built with Axum.
//!
//! # Endpoints
//!
//! ## Catalog
//! - `GET /api/v1/catalog` - Categories, metrics and aggregation policies
//!
//! ## Exports
//! - `POST /api/v1/exports` - Upload and extract an export (raw body)
//! - `GET /api/v1/exports` - List held exports
//! - `GET /api/v1/exports/:id` - Export summary
//! - `DELETE /api/v1/exports/:id` - Drop an export
//! - `GET /api/v1/exports/:id/categories/:category/metrics` - Metrics with data
//! - `GET /api/v1/exports/:id/daily` - Daily series and summary (json or csv)
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use vitalog::api::{serve, ApiConfig, AppState};
//! use vitalog::catalog::MetricCatalog;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApiConfig::default();
//!     let catalog = Arc::new(MetricCatalog::healthkit().clone());
//!
//!     let state = AppState::new(catalog, config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState, DatasetStore};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes();

    let api_routes = Router::new()
        // Catalog routes
        .route("/catalog", get(routes::catalog::get_catalog))
        // Export routes
        .route(
            "/exports",
            post(routes::exports::upload_export).get(routes::exports::list_exports),
        )
        .route(
            "/exports/:id",
            get(routes::exports::get_export).delete(routes::exports::delete_export),
        )
        .route(
            "/exports/:id/categories/:category/metrics",
            get(routes::exports::category_metrics),
        )
        // Daily series
        .route("/exports/:id/daily", get(routes::daily::daily_series))
        .layer(DefaultBodyLimit::max(upload_limit));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Vitalog API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Vitalog API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MetricCatalog;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use tower::util::ServiceExt;

    const EXPORT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<HealthData locale="en_US">
 <Record type="HKQuantityTypeIdentifierHeartRate" unit="count/min" value="60" startDate="2024-02-01 08:00:00 +0000"/>
 <Record type="HKQuantityTypeIdentifierHeartRate" unit="count/min" value="70" startDate="2024-02-01 12:00:00 +0000"/>
 <Record type="HKQuantityTypeIdentifierHeartRate" unit="count/min" value="80" startDate="2024-02-01 20:00:00 +0000"/>
 <Record type="HKQuantityTypeIdentifierStepCount" unit="count" value="1000" startDate="2024-02-01 09:00:00 +0000"/>
 <Record type="HKQuantityTypeIdentifierStepCount" unit="count" value="2000" startDate="2024-02-01 18:00:00 +0000"/>
 <Record type="HKQuantityTypeIdentifierStepCount" unit="count" value="4000" startDate="2024-02-03 18:00:00 +0000"/>
 <Record type="HKQuantityTypeIdentifierAppleStandTime" unit="min" value="5" startDate="2024-02-01 18:00:00 +0000"/>
</HealthData>
"#;

    fn create_test_app() -> Router {
        create_app_with(ApiConfig::default())
    }

    fn create_app_with(config: ApiConfig) -> Router {
        let catalog = Arc::new(MetricCatalog::healthkit().clone());
        build_router(AppState::new(catalog, config))
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn get(app: &Router, uri: &str) -> Response {
        send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn upload(app: &Router, body: &str) -> Response {
        send(
            app,
            Request::builder()
                .method("POST")
                .uri("/api/v1/exports?name=export.xml")
                .header(header::CONTENT_TYPE, "application/xml")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn upload_id(app: &Router) -> String {
        let response = upload(app, EXPORT_XML).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = create_test_app();

        assert_eq!(get(&app, "/health/live").await.status(), StatusCode::OK);
        assert_eq!(get(&app, "/health/ready").await.status(), StatusCode::OK);

        let response = get(&app, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["catalog_metrics"], 25);
        assert_eq!(body["datasets"], 0);
    }

    #[tokio::test]
    async fn test_catalog() {
        let app = create_test_app();
        let body = json_body(get(&app, "/api/v1/catalog").await).await;

        assert_eq!(body["total_metrics"], 25);
        assert_eq!(body["categories"][0]["name"], "Activity");
        assert_eq!(body["categories"][0]["metrics"][0]["name"], "StepCount");
        assert_eq!(body["categories"][0]["metrics"][0]["policy"], "sum");
    }

    #[tokio::test]
    async fn test_upload_summary() {
        let app = create_test_app();
        let response = upload(&app, EXPORT_XML).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        assert_eq!(body["name"], "export.xml");
        assert_eq!(body["stats"]["records_seen"], 7);
        assert_eq!(body["stats"]["observations"], 6);
        assert_eq!(body["stats"]["unrecognized"], 1);
        assert_eq!(body["date_range"]["start"], "2024-02-01");
        assert_eq!(body["date_range"]["end"], "2024-02-03");
        assert_eq!(body["categories"], serde_json::json!(["Activity", "Vital Signs"]));

        let id = body["id"].as_str().unwrap();
        let listed = json_body(get(&app, "/api/v1/exports").await).await;
        assert_eq!(listed["exports"][0]["id"], id);
    }

    #[tokio::test]
    async fn test_upload_rejects_malformed() {
        let app = create_test_app();

        let response = upload(&app, "<HealthData><Record></HealthData>").await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "MALFORMED_EXPORT");

        let response = upload(&app, "").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_too_large() {
        let app = create_app_with(ApiConfig {
            max_upload_mb: 0,
            ..ApiConfig::default()
        });
        let response = upload(&app, EXPORT_XML).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );

        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
        assert!(body["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_category_metrics() {
        let app = create_test_app();
        let id = upload_id(&app).await;

        let body = json_body(
            get(&app, &format!("/api/v1/exports/{}/categories/Activity/metrics", id)).await,
        )
        .await;
        assert_eq!(body["metrics"].as_array().unwrap().len(), 1);
        assert_eq!(body["metrics"][0]["id"], "HKQuantityTypeIdentifierStepCount");
        assert_eq!(body["metrics"][0]["observations"], 3);

        let response =
            get(&app, &format!("/api/v1/exports/{}/categories/Hobbies/metrics", id)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_daily_heart_rate() {
        let app = create_test_app();
        let id = upload_id(&app).await;

        let response = get(
            &app,
            &format!("/api/v1/exports/{}/daily?metric=HeartRate", id),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["policy"], "mean_min_max");
        assert_eq!(
            body["rows"],
            serde_json::json!([{"date": "2024-02-01", "mean": 70.0, "min": 60.0, "max": 80.0}])
        );
        assert_eq!(body["summary"]["mean"], 70.0);
    }

    #[tokio::test]
    async fn test_daily_steps_with_range() {
        let app = create_test_app();
        let id = upload_id(&app).await;

        let body = json_body(
            get(
                &app,
                &format!(
                    "/api/v1/exports/{}/daily?metric=HKQuantityTypeIdentifierStepCount&start=2024-02-01&end=2024-02-29",
                    id
                ),
            )
            .await,
        )
        .await;

        assert_eq!(
            body["rows"],
            serde_json::json!([
                {"date": "2024-02-01", "sum": 3000.0},
                {"date": "2024-02-03", "sum": 4000.0}
            ])
        );
        assert_eq!(body["summary"]["field"], "sum");
        assert_eq!(body["summary"]["mean"], 3500.0);
        assert_eq!(body["summary"]["max"], 4000.0);
        assert_eq!(body["summary"]["min"], 3000.0);
    }

    #[tokio::test]
    async fn test_daily_summary_field() {
        let app = create_test_app();
        let id = upload_id(&app).await;

        let body = json_body(
            get(
                &app,
                &format!("/api/v1/exports/{}/daily?metric=HeartRate&field=max", id),
            )
            .await,
        )
        .await;
        assert_eq!(body["summary"]["field"], "max");
        assert_eq!(body["summary"]["mean"], 80.0);

        let response = get(
            &app,
            &format!("/api/v1/exports/{}/daily?metric=StepCount&field=max", id),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = get(
            &app,
            &format!("/api/v1/exports/{}/daily?metric=StepCount&field=median", id),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_daily_foreign_field_rejected_without_data() {
        let app = create_test_app();
        let id = upload_id(&app).await;

        for format in ["json", "csv"] {
            let response = get(
                &app,
                &format!(
                    "/api/v1/exports/{}/daily?metric=StepCount&field=max&start=2025-01-01&end=2025-01-02&format={}",
                    id, format
                ),
            )
            .await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
        }

        let response = upload(&app, "<HealthData/>").await;
        let empty_id = json_body(response).await["id"].as_str().unwrap().to_string();
        let response = get(
            &app,
            &format!("/api/v1/exports/{}/daily?metric=StepCount&field=max", empty_id),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_daily_invalid_range() {
        let app = create_test_app();
        let id = upload_id(&app).await;

        let response = get(
            &app,
            &format!(
                "/api/v1/exports/{}/daily?metric=StepCount&start=2024-02-10&end=2024-02-01",
                id
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_daily_no_data() {
        let app = create_test_app();
        let id = upload_id(&app).await;

        let body = json_body(
            get(&app, &format!("/api/v1/exports/{}/daily?metric=BodyMass", id)).await,
        )
        .await;
        assert_eq!(body["status"], "no_data");
        assert!(body["summary"].is_null());
        assert_eq!(body["rows"], serde_json::json!([]));

        let body = json_body(
            get(
                &app,
                &format!(
                    "/api/v1/exports/{}/daily?metric=StepCount&start=2024-03-01&end=2024-03-31",
                    id
                ),
            )
            .await,
        )
        .await;
        assert_eq!(body["status"], "no_data");
        assert!(body["summary"].is_null());
    }

    #[tokio::test]
    async fn test_daily_unknown_metric_and_format() {
        let app = create_test_app();
        let id = upload_id(&app).await;

        let response = get(&app, &format!("/api/v1/exports/{}/daily?metric=Mood", id)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = get(
            &app,
            &format!("/api/v1/exports/{}/daily?metric=StepCount&format=xlsx", id),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_daily_csv() {
        let app = create_test_app();
        let id = upload_id(&app).await;

        let response = get(
            &app,
            &format!("/api/v1/exports/{}/daily?metric=StepCount&format=csv", id),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(
            std::str::from_utf8(&bytes).unwrap(),
            "date,sum\n2024-02-01,3000\n2024-02-03,4000\n"
        );
    }

    #[tokio::test]
    async fn test_daily_csv_for_empty_export() {
        let app = create_test_app();
        let response = upload(&app, "<HealthData/>").await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = json_body(response).await["id"].as_str().unwrap().to_string();

        let response = get(
            &app,
            &format!("/api/v1/exports/{}/daily?metric=HeartRate&format=csv", id),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"HeartRate.csv\""
        );

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap(), "date,mean,min,max\n");

        let body = json_body(
            get(&app, &format!("/api/v1/exports/{}/daily?metric=HeartRate", id)).await,
        )
        .await;
        assert_eq!(body["status"], "no_data");
    }

    #[tokio::test]
    async fn test_delete_export() {
        let app = create_test_app();
        let id = upload_id(&app).await;
        let uri = format!("/api/v1/exports/{}", id);

        assert_eq!(get(&app, &uri).await.status(), StatusCode::OK);

        let delete = || {
            Request::builder()
                .method("DELETE")
                .uri(&uri)
                .body(Body::empty())
                .unwrap()
        };
        assert_eq!(send(&app, delete()).await.status(), StatusCode::NO_CONTENT);
        assert_eq!(send(&app, delete()).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(get(&app, &uri).await.status(), StatusCode::NOT_FOUND);
    }
}
