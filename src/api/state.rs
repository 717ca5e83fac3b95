//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::catalog::MetricCatalog;
use crate::extract::Dataset;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use uuid::Uuid;

pub use crate::config::ApiConfig;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Metric catalog used for extraction and aggregation
    pub catalog: Arc<MetricCatalog>,
    /// Uploaded exports, already extracted
    pub datasets: Arc<DatasetStore>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState
    pub fn new(catalog: Arc<MetricCatalog>, config: ApiConfig) -> Self {
        Self {
            catalog,
            datasets: Arc::new(DatasetStore::new(config.max_datasets)),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// An extracted export held by the server
#[derive(Debug)]
pub struct StoredDataset {
    pub id: Uuid,
    /// Client-supplied file name, if any
    pub name: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub dataset: Arc<Dataset>,
}

#[derive(Default)]
struct StoreInner {
    entries: HashMap<Uuid, Arc<StoredDataset>>,
    /// Insertion order, oldest first
    order: VecDeque<Uuid>,
}

/// Bounded in-memory dataset store
///
/// Holds at most `capacity` datasets; inserting beyond that drops the oldest.
pub struct DatasetStore {
    inner: RwLock<StoreInner>,
    capacity: usize,
}

impl DatasetStore {
    /// Create a store keeping at most `capacity` datasets (minimum 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            capacity: capacity.max(1),
        }
    }

    /// Store a dataset, returning the new entry and the ids it evicted
    pub async fn insert(
        &self,
        name: Option<String>,
        dataset: Dataset,
    ) -> (Arc<StoredDataset>, Vec<Uuid>) {
        let stored = Arc::new(StoredDataset {
            id: Uuid::new_v4(),
            name,
            uploaded_at: Utc::now(),
            dataset: Arc::new(dataset),
        });

        let mut inner = self.inner.write().await;
        let mut evicted = Vec::new();
        while inner.order.len() >= self.capacity {
            match inner.order.pop_front() {
                Some(old) => {
                    inner.entries.remove(&old);
                    evicted.push(old);
                }
                None => break,
            }
        }
        inner.order.push_back(stored.id);
        inner.entries.insert(stored.id, Arc::clone(&stored));

        (stored, evicted)
    }

    /// Look up a dataset
    pub async fn get(&self, id: &Uuid) -> Option<Arc<StoredDataset>> {
        self.inner.read().await.entries.get(id).cloned()
    }

    /// Drop a dataset, returning whether it existed
    pub async fn remove(&self, id: &Uuid) -> bool {
        let mut inner = self.inner.write().await;
        if inner.entries.remove(id).is_some() {
            inner.order.retain(|x| x != id);
            true
        } else {
            false
        }
    }

    /// All datasets, oldest first
    pub async fn list(&self) -> Vec<Arc<StoredDataset>> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter_map(|id| inner.entries.get(id).cloned())
            .collect()
    }

    /// Number of datasets held
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Maximum number of datasets held
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
