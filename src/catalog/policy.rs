//! Aggregation policies
//!
//! Every recognized metric is bound to exactly one policy when the catalog is
//! built. The policy decides which fields a daily row carries.

use serde::{Deserialize, Serialize};

/// How same-day values of a metric combine into one daily row
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum AggregationPolicy {
    /// Arithmetic mean (body measurements, oxygen saturation, ...)
    #[default]
    Mean,
    /// Daily total (steps, distance, energy)
    Sum,
    /// Mean with a min/max band (heart-rate family)
    MeanMinMax,
}

impl AggregationPolicy {
    /// Fields carried by a daily row under this policy, in display order
    pub fn fields(&self) -> &'static [SeriesField] {
        match self {
            Self::Mean => &[SeriesField::Mean],
            Self::Sum => &[SeriesField::Sum],
            Self::MeanMinMax => &[SeriesField::Mean, SeriesField::Min, SeriesField::Max],
        }
    }

    /// Field summarized for display
    pub fn primary_field(&self) -> SeriesField {
        match self {
            Self::Sum => SeriesField::Sum,
            Self::Mean | Self::MeanMinMax => SeriesField::Mean,
        }
    }
}

impl std::fmt::Display for AggregationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mean => write!(f, "mean"),
            Self::Sum => write!(f, "sum"),
            Self::MeanMinMax => write!(f, "mean_min_max"),
        }
    }
}

/// A named numeric field of a daily row
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SeriesField {
    Mean,
    Sum,
    Min,
    Max,
}

impl SeriesField {
    /// Column name used in tables and CSV output
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Sum => "sum",
            Self::Min => "min",
            Self::Max => "max",
        }
    }

    /// Human-readable series label for charts
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mean => "Average",
            Self::Sum => "Total",
            Self::Min => "Minimum",
            Self::Max => "Maximum",
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mean" | "avg" | "average" => Some(Self::Mean),
            "sum" | "total" => Some(Self::Sum),
            "min" | "minimum" => Some(Self::Min),
            "max" | "maximum" => Some(Self::Max),
            _ => None,
        }
    }
}

impl std::fmt::Display for SeriesField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
