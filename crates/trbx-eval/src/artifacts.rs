use std::path::{Path, PathBuf};

use crate::errors::EvalError;
use crate::metrics::QualityMetrics;
use crate::report::{render_report, ReportOptions};

/// Paths of the written quality artifacts.
#[derive(Debug, Clone)]
pub struct QualityArtifacts {
    pub metrics_path: PathBuf,
    pub report_path: PathBuf,
    pub report: String,
}

/// Write `quality.json` and `quality.md` into `out_dir`.
pub fn write_quality_artifacts(
    metrics: &QualityMetrics,
    out_dir: &Path,
    options: &ReportOptions,
) -> Result<QualityArtifacts, EvalError> {
    std::fs::create_dir_all(out_dir)?;

    let metrics_path = out_dir.join("quality.json");
    std::fs::write(&metrics_path, serde_json::to_vec_pretty(metrics)?)?;

    let report = render_report(metrics, options);
    let report_path = out_dir.join("quality.md");
    std::fs::write(&report_path, report.as_bytes())?;

    Ok(QualityArtifacts {
        metrics_path,
        report_path,
        report,
    })
}
