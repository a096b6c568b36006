use serde::{Deserialize, Serialize};
use trbx_core::{dataset_fingerprint, Dataset};

use crate::quality::{ColumnFailure, QualityReport};

/// Metrics contract version for `quality.json`.
pub const QUALITY_VERSION: &str = "0.1";

/// Name of the per-column statistic recorded in the metrics.
pub const STATISTIC: &str = "ks_2samp";

/// Machine-readable quality metrics for one evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub quality_version: String,
    pub statistic: String,
    pub real: DatasetRef,
    pub synthetic: DatasetRef,
    /// Mean KS distance over available columns; lower is better.
    pub global_score: Option<f64>,
    pub columns_evaluated: usize,
    pub columns_unavailable: usize,
    pub columns: Vec<ColumnMetrics>,
}

/// Shape and fingerprint of an evaluated dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetRef {
    pub rows: usize,
    pub columns: usize,
    pub fingerprint: String,
}

/// Outcome for one column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMetrics {
    pub column: String,
    pub ks_statistic: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<ColumnFailure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl QualityMetrics {
    pub fn new(report: &QualityReport, real: &Dataset, synthetic: &Dataset) -> Self {
        let columns: Vec<ColumnMetrics> = report
            .columns()
            .iter()
            .map(|entry| match entry.score {
                Ok(statistic) => ColumnMetrics {
                    column: entry.column.clone(),
                    ks_statistic: Some(statistic),
                    failure: None,
                    message: None,
                },
                Err(failure) => ColumnMetrics {
                    column: entry.column.clone(),
                    ks_statistic: None,
                    failure: Some(failure),
                    message: Some(failure.to_string()),
                },
            })
            .collect();

        Self {
            quality_version: QUALITY_VERSION.to_string(),
            statistic: STATISTIC.to_string(),
            real: DatasetRef::new(real),
            synthetic: DatasetRef::new(synthetic),
            global_score: report.aggregate(),
            columns_evaluated: report.available_count(),
            columns_unavailable: columns.len() - report.available_count(),
            columns,
        }
    }
}

impl DatasetRef {
    pub fn new(dataset: &Dataset) -> Self {
        Self {
            rows: dataset.row_count(),
            columns: dataset.column_count(),
            fingerprint: dataset_fingerprint(dataset),
        }
    }
}
