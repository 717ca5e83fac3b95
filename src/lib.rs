//! # Vitalog
//!
//! Apple Health export analysis: extract typed observations from
//! `export.xml` / `export.zip`, roll them up into per-day series and reduce
//! those series to headline summaries.
//!
//! ## Pipeline
//!
//! ```text
//! export.zip ─► RecordExtractor ─► Dataset ─► DailyAggregator ─► DailySeries ─► Summary
//!                      ▲                              ▲
//!                      └──────── MetricCatalog ───────┘
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Metric categories and per-metric aggregation policy
//! - [`extract`]: Streaming export reader
//! - [`aggregate`]: Daily aggregation and summaries
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vitalog::aggregate::DailyAggregator;
//! use vitalog::catalog::MetricCatalog;
//! use vitalog::extract::RecordExtractor;
//! use chrono::NaiveDate;
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = MetricCatalog::healthkit();
//!     let dataset = RecordExtractor::new(catalog).extract_path(Path::new("export.zip"))?;
//!
//!     let series = DailyAggregator::new(catalog).aggregate(
//!         dataset.observations(),
//!         "HKQuantityTypeIdentifierStepCount",
//!         NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
//!         NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
//!     )?;
//!
//!     if !series.is_empty() {
//!         println!("{}", series.summary()?);
//!     }
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod api;
pub mod catalog;
pub mod config;
pub mod extract;
pub mod logging;

// Re-export top-level types for convenience
pub use aggregate::{
    summarize, AggregateError, AggregateResult, DailyAggregate, DailyAggregator, DailySeries,
    DailyValues, DateRange, Summary,
};

pub use catalog::{AggregationPolicy, CatalogError, CatalogResult, MetricCatalog, SeriesField};

pub use extract::{Dataset, ExtractError, ExtractResult, ExtractStats, Observation, RecordExtractor};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{ApiConfig, CatalogConfig, Config, ConfigError, LoggingConfig};
