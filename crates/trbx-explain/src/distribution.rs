use std::cmp::Ordering;

use serde::Serialize;

use crate::attribution::Attribution;
use crate::errors::ExplainError;

/// Default number of features kept by [`top_feature_distributions`].
pub const DEFAULT_TOP_N: usize = 5;

/// Five-number summary of the signed attribution values of one feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureDistribution {
    pub feature: String,
    pub mean_abs: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Summarize the attribution distribution of the `top_n` most important
/// features of one class, most important first.
///
/// `class_idx` selects the class of a per-class attribution and is ignored
/// for a single matrix.
pub fn top_feature_distributions<S: AsRef<str>>(
    attribution: &Attribution,
    feature_names: &[S],
    class_idx: usize,
    top_n: usize,
) -> Result<Vec<FeatureDistribution>, ExplainError> {
    let matrix = attribution.class(class_idx)?;
    if matrix.features() != feature_names.len() {
        return Err(ExplainError::shape(
            "feature names",
            matrix.features(),
            feature_names.len(),
        ));
    }
    if matrix.rows() == 0 {
        return Err(ExplainError::InvalidInput(
            "attribution has no rows".to_string(),
        ));
    }

    let means = matrix.mean_abs();
    let mut order: Vec<usize> = (0..matrix.features()).collect();
    order.sort_by(|a, b| means[*b].partial_cmp(&means[*a]).unwrap_or(Ordering::Equal));
    order.truncate(top_n);

    Ok(order
        .into_iter()
        .map(|feature| {
            let mut values = matrix.feature_values(feature);
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
            FeatureDistribution {
                feature: feature_names[feature].as_ref().to_string(),
                mean_abs: means[feature],
                min: values[0],
                q1: quantile(&values, 0.25),
                median: quantile(&values, 0.5),
                q3: quantile(&values, 0.75),
                max: values[values.len() - 1],
            }
        })
        .collect())
}

/// Linear-interpolated quantile of a sorted, non-empty sample.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}
