use std::cmp::Ordering;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::metrics::{ColumnMetrics, QualityMetrics};

/// Options for the markdown quality report.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReportOptions {
    /// Limit the number of columns listed as most divergent.
    pub max_examples: usize,
    /// Columns with a KS distance at or above this value are flagged.
    pub divergence_threshold: f64,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            max_examples: 20,
            divergence_threshold: 0.2,
        }
    }
}

/// Render a deterministic markdown report from quality metrics.
pub fn render_report(metrics: &QualityMetrics, options: &ReportOptions) -> String {
    let mut lines = Vec::new();

    lines.push("# Synthetic Data Quality Report".to_string());
    lines.push(String::new());
    lines.push("## Summary".to_string());
    lines.push(format!("- statistic: {}", metrics.statistic));
    lines.push(format!("- global_score: {}", format_score(metrics.global_score)));
    lines.push(format!(
        "- real: {} row(s), {} column(s)",
        metrics.real.rows, metrics.real.columns
    ));
    lines.push(format!(
        "- synthetic: {} row(s), {} column(s)",
        metrics.synthetic.rows, metrics.synthetic.columns
    ));
    lines.push(format!("- columns_evaluated: {}", metrics.columns_evaluated));
    lines.push(format!(
        "- columns_unavailable: {}",
        metrics.columns_unavailable
    ));
    lines.push(String::new());

    lines.push("## Per-column KS distance".to_string());
    lines.push("| column | ks_statistic |".to_string());
    lines.push("| --- | --- |".to_string());
    for column in &metrics.columns {
        lines.push(format!(
            "| {} | {} |",
            column.column,
            format_score(column.ks_statistic)
        ));
    }
    lines.push(String::new());

    let unavailable: Vec<&ColumnMetrics> = metrics
        .columns
        .iter()
        .filter(|column| column.ks_statistic.is_none())
        .collect();
    if !unavailable.is_empty() {
        lines.push("## Unavailable columns".to_string());
        for column in &unavailable {
            let reason = column.message.as_deref().unwrap_or("unknown failure");
            lines.push(format!("- {}: {}", column.column, reason));
        }
        lines.push(String::new());
    }

    let divergent = most_divergent(metrics, options);
    if !divergent.is_empty() {
        lines.push("## Most divergent columns".to_string());
        for (column, statistic) in divergent.iter().take(options.max_examples) {
            lines.push(format!("- {column}: {statistic:.4}"));
        }
        lines.push(String::new());
    }

    lines.push("## Recommendations".to_string());
    lines.extend(recommendations(metrics, divergent.len(), unavailable.len()));
    lines.join("\n")
}

fn most_divergent<'a>(metrics: &'a QualityMetrics, options: &ReportOptions) -> Vec<(&'a str, f64)> {
    let mut divergent: Vec<(&str, f64)> = metrics
        .columns
        .iter()
        .filter_map(|column| {
            column
                .ks_statistic
                .filter(|statistic| *statistic >= options.divergence_threshold)
                .map(|statistic| (column.column.as_str(), statistic))
        })
        .collect();
    divergent.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    divergent
}

fn recommendations(metrics: &QualityMetrics, divergent: usize, unavailable: usize) -> Vec<String> {
    let mut lines = Vec::new();
    if metrics.global_score.is_none() {
        lines.push("- no column could be scored; check discrete columns and column names.".to_string());
    }
    if divergent > 0 {
        lines.push("- retrain the generator longer or with more data for divergent columns.".to_string());
    }
    if unavailable > 0 {
        lines.push("- ensure synthetic output keeps every numeric column of the real data.".to_string());
    }
    if lines.is_empty() {
        lines.push("- no divergent columns; compare scores across runs for drift.".to_string());
    }
    lines
}

fn format_score(score: Option<f64>) -> String {
    score
        .map(|value| format!("{value:.4}"))
        .unwrap_or_else(|| "unavailable".to_string())
}
