//! Metric Catalog
//!
//! Maps category names to the metric identifiers Vitalog recognizes and binds
//! each identifier to its [`AggregationPolicy`].
//!
//! - **policy**: Aggregation policy and series field enums
//! - **builtin**: The HealthKit identifier table
//! - **error**: Error types
//!
//! The catalog is built once and never mutated. Construction precomputes the
//! identifier -> (category, policy) index, so membership tests and category
//! back-lookups are single hash lookups, and a misconfigured table (the same
//! identifier in two categories) is rejected up front.
//!
//! # Example
//!
//! ```rust
//! use vitalog::catalog::{AggregationPolicy, MetricCatalog};
//!
//! let catalog = MetricCatalog::healthkit();
//! assert_eq!(
//!     catalog.category_of("HKQuantityTypeIdentifierStepCount").unwrap(),
//!     "Activity"
//! );
//! assert_eq!(
//!     catalog.policy_of("HKQuantityTypeIdentifierHeartRate").unwrap(),
//!     AggregationPolicy::MeanMinMax
//! );
//! ```

mod builtin;
pub mod error;
pub mod policy;

pub use error::{CatalogError, CatalogResult};
pub use policy::{AggregationPolicy, SeriesField};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

/// Where a recognized metric lives and how it aggregates
#[derive(Debug, Clone, Copy)]
struct MetricEntry {
    category: usize,
    policy: AggregationPolicy,
}

/// One category with its metrics in display order
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub name: String,
    pub metrics: Vec<String>,
}

/// Immutable category -> metrics mapping with per-metric policy
#[derive(Debug, Clone)]
pub struct MetricCatalog {
    categories: Vec<Category>,
    /// Flattened identifier set, metric id -> entry
    index: HashMap<String, MetricEntry>,
    /// Category name -> position in `categories`
    by_name: HashMap<String, usize>,
}

impl MetricCatalog {
    /// Start building a catalog
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// The process-wide built-in HealthKit catalog
    ///
    /// # Panics
    /// Panics on first use if the built-in table is inconsistent, which the
    /// test suite rules out.
    pub fn healthkit() -> &'static MetricCatalog {
        static CATALOG: OnceLock<MetricCatalog> = OnceLock::new();
        CATALOG.get_or_init(|| {
            let mut builder = Self::builder();
            for (name, metrics) in builtin::HEALTHKIT_CATEGORIES {
                builder = builder.category(*name, metrics.iter().copied());
            }
            builder
                .build()
                .expect("built-in HealthKit catalog must be consistent")
        })
    }

    /// Parse a catalog from TOML
    ///
    /// ```toml
    /// [[category]]
    /// name = "Activity"
    ///
    /// [[category.metric]]
    /// id = "HKQuantityTypeIdentifierStepCount"
    /// policy = "sum"
    /// ```
    pub fn from_toml_str(content: &str) -> CatalogResult<Self> {
        let file: CatalogFile =
            toml::from_str(content).map_err(|e| CatalogError::InvalidFile(e.to_string()))?;

        let mut builder = Self::builder();
        for category in file.category {
            builder = builder.category(
                category.name,
                category.metric.into_iter().map(|m| (m.id, m.policy)),
            );
        }
        builder.build()
    }

    /// Load a catalog from a TOML file
    pub fn load(path: &Path) -> CatalogResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::InvalidFile(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Check whether a metric identifier is recognized
    pub fn contains(&self, metric_id: &str) -> bool {
        self.index.contains_key(metric_id)
    }

    /// Category a metric belongs to
    pub fn category_of(&self, metric_id: &str) -> CatalogResult<&str> {
        self.entry(metric_id)
            .map(|entry| self.categories[entry.category].name.as_str())
    }

    /// Aggregation policy bound to a metric
    pub fn policy_of(&self, metric_id: &str) -> CatalogResult<AggregationPolicy> {
        self.entry(metric_id).map(|entry| entry.policy)
    }

    /// Metrics of a category, in display order
    pub fn metrics_in(&self, category: &str) -> CatalogResult<&[String]> {
        self.by_name
            .get(category)
            .map(|&idx| self.categories[idx].metrics.as_slice())
            .ok_or_else(|| CatalogError::UnknownCategory(category.to_string()))
    }

    /// All categories in display order
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Category names in display order
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    /// Every recognized metric, category by category
    pub fn all_metrics(&self) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .flat_map(|c| c.metrics.iter().map(String::as_str))
    }

    /// Number of recognized metrics
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if the catalog has no metrics
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Resolve a user-supplied metric name
    ///
    /// Accepts a full identifier or its display name (case-insensitive),
    /// e.g. `StepCount` or `stepcount`.
    pub fn resolve(&self, name: &str) -> CatalogResult<&str> {
        if let Some((id, _)) = self.index.get_key_value(name) {
            return Ok(id.as_str());
        }

        self.all_metrics()
            .find(|id| display_name(id).eq_ignore_ascii_case(name))
            .ok_or_else(|| CatalogError::UnknownMetric(name.to_string()))
    }

    fn entry(&self, metric_id: &str) -> CatalogResult<MetricEntry> {
        self.index
            .get(metric_id)
            .copied()
            .ok_or_else(|| CatalogError::UnknownMetric(metric_id.to_string()))
    }
}

/// Short display name for a metric identifier
///
/// `HKQuantityTypeIdentifierStepCount` becomes `StepCount`. Identifiers
/// without an `Identifier` marker are returned unchanged.
pub fn display_name(metric_id: &str) -> &str {
    metric_id
        .split_once("Identifier")
        .map(|(_, rest)| rest)
        .filter(|rest| !rest.is_empty())
        .unwrap_or(metric_id)
}

/// Builder validating catalog invariants on [`CatalogBuilder::build`]
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    categories: Vec<(String, Vec<(String, AggregationPolicy)>)>,
}

impl CatalogBuilder {
    /// Add a category with its metrics
    pub fn category<N, I, M>(mut self, name: N, metrics: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (M, AggregationPolicy)>,
        M: Into<String>,
    {
        let metrics = metrics
            .into_iter()
            .map(|(id, policy)| (id.into(), policy))
            .collect();
        self.categories.push((name.into(), metrics));
        self
    }

    /// Validate and build the catalog
    pub fn build(self) -> CatalogResult<MetricCatalog> {
        let mut categories = Vec::with_capacity(self.categories.len());
        let mut index: HashMap<String, MetricEntry> = HashMap::new();
        let mut by_name = HashMap::new();

        for (position, (name, metrics)) in self.categories.into_iter().enumerate() {
            if by_name.insert(name.clone(), position).is_some() {
                return Err(CatalogError::DuplicateCategory(name));
            }
            if metrics.is_empty() {
                return Err(CatalogError::EmptyCategory(name));
            }

            let mut ids = Vec::with_capacity(metrics.len());
            for (id, policy) in metrics {
                if let Some(existing) = index.get(&id) {
                    // The current category is not pushed yet, so a miss means
                    // it listed the id twice itself
                    let first = categories
                        .get(existing.category)
                        .map(|c: &Category| c.name.clone())
                        .unwrap_or_else(|| name.clone());
                    return Err(CatalogError::DuplicateMetric {
                        metric: id,
                        first,
                        second: name,
                    });
                }
                index.insert(
                    id.clone(),
                    MetricEntry {
                        category: position,
                        policy,
                    },
                );
                ids.push(id);
            }

            categories.push(Category { name, metrics: ids });
        }

        Ok(MetricCatalog {
            categories,
            index,
            by_name,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    category: Vec<CategoryFile>,
}

#[derive(Debug, Deserialize)]
struct CategoryFile {
    name: String,
    #[serde(default)]
    metric: Vec<MetricFile>,
}

#[derive(Debug, Deserialize)]
struct MetricFile {
    id: String,
    #[serde(default)]
    policy: AggregationPolicy,
}
