//! Record Extractor
//!
//! Turns an Apple Health export into a [`Dataset`] of typed observations:
//!
//! - **reader**: Streaming XML walk over `Record` elements
//! - **archive**: `export.zip` support
//! - **observation**: Observation type and attribute coercion
//! - **dataset**: Extracted collection plus skip statistics
//! - **error**: Error types
//!
//! # Failure policy
//!
//! ```text
//! unrecognized type / bad value / bad startDate  -> record skipped, counted
//! unreadable source / ill-formed markup          -> ExtractError, no dataset
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use vitalog::catalog::MetricCatalog;
//! use vitalog::extract::RecordExtractor;
//! use std::path::Path;
//!
//! let extractor = RecordExtractor::new(MetricCatalog::healthkit());
//! let dataset = extractor.extract_path(Path::new("export.zip"))?;
//! println!("{}", dataset.extract_stats());
//! # Ok::<(), vitalog::extract::ExtractError>(())
//! ```

pub mod archive;
pub mod dataset;
pub mod error;
pub mod observation;
pub mod reader;

pub use dataset::{Dataset, ExtractStats};
pub use error::{ExtractError, ExtractResult};
pub use observation::{parse_start_date, parse_value, Observation, START_DATE_FORMAT};
pub use reader::{RecordExtractor, DEFAULT_READ_BUFFER};
