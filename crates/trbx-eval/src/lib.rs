//! Distributional quality evaluation for synthetic tabular data.
//!
//! Every numeric, non-discrete column of the real dataset is compared with
//! its synthetic counterpart using the two-sample Kolmogorov-Smirnov
//! statistic; the available per-column scores are averaged into one
//! reliability score (lower is better).

pub mod artifacts;
pub mod errors;
pub mod ks;
pub mod metrics;
pub mod quality;
pub mod report;

pub use artifacts::{write_quality_artifacts, QualityArtifacts};
pub use errors::EvalError;
pub use ks::{ks_statistic, KsError};
pub use metrics::{ColumnMetrics, DatasetRef, QualityMetrics, QUALITY_VERSION, STATISTIC};
pub use quality::{
    evaluate_quality, round_score, ColumnFailure, ColumnQuality, ColumnScore, QualityReport, Side,
};
pub use report::{render_report, ReportOptions};
