use serde::Serialize;
use trbx_core::{Column, ColumnValues, Dataset};

use crate::attribution::Attribution;
use crate::errors::ExplainError;
use crate::explainer::TreeExplainer;

/// Mean absolute attribution and observed value range of one feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: String,
    /// One value per importance column (see [`ShapSummary::labels`]).
    pub importance: Vec<f64>,
    /// Observed range of the raw feature values, e.g. `65.00 → 80.00`.
    pub range: String,
}

impl FeatureImportance {
    /// The value used for ranking and narrative: the single importance, or
    /// the largest per-class importance.
    pub fn headline(&self) -> f64 {
        self.importance.iter().copied().fold(0.0, f64::max)
    }
}

/// Feature importance table plus the raw attribution values it came from.
#[derive(Debug, Clone)]
pub struct ShapSummary {
    pub labels: Vec<String>,
    pub features: Vec<FeatureImportance>,
    pub attribution: Attribution,
}

impl ShapSummary {
    pub fn feature(&self, name: &str) -> Option<&FeatureImportance> {
        self.features.iter().find(|feature| feature.feature == name)
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.features
            .iter()
            .map(|feature| feature.feature.as_str())
            .collect()
    }
}

/// Compute attribution values for `data` and summarize them per feature.
pub fn feature_importance<E: TreeExplainer + ?Sized>(
    explainer: &E,
    data: &Dataset,
) -> Result<ShapSummary, ExplainError> {
    if data.is_empty() {
        return Err(ExplainError::InvalidInput(
            "data has no columns".to_string(),
        ));
    }

    let attribution = explainer.shap_values(data)?;
    let (rows, features) = attribution.shape();
    if features != data.column_count() {
        return Err(ExplainError::shape(
            "attribution features",
            data.column_count(),
            features,
        ));
    }
    if rows != data.row_count() {
        return Err(ExplainError::shape("attribution rows", data.row_count(), rows));
    }

    let per_class: Vec<Vec<f64>> = attribution
        .matrices()
        .iter()
        .map(|matrix| matrix.mean_abs())
        .collect();

    let features = data
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| FeatureImportance {
            feature: column.name.clone(),
            importance: per_class.iter().map(|values| values[idx]).collect(),
            range: observed_range(column),
        })
        .collect();

    Ok(ShapSummary {
        labels: attribution.labels(),
        features,
        attribution,
    })
}

fn observed_range(column: &Column) -> String {
    match &column.values {
        ColumnValues::Numeric(values) => {
            let mut finite = values.iter().flatten().copied().filter(|v| v.is_finite());
            let Some(first) = finite.next() else {
                return "n/a".to_string();
            };
            let (min, max) = finite.fold((first, first), |(min, max), value| {
                (min.min(value), max.max(value))
            });
            format!("{min:.2} → {max:.2}")
        }
        ColumnValues::Categorical(values) => {
            let present = values.iter().flatten();
            match (present.clone().min(), present.max()) {
                (Some(min), Some(max)) => format!("{min} → {max}"),
                _ => "n/a".to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_range_skips_missing_cells() {
        let column = Column::numeric("age", vec![Some(70.0), None, Some(65.5), Some(80.0)]);
        assert_eq!(observed_range(&column), "65.50 → 80.00");
    }

    #[test]
    fn categorical_range_is_lexicographic() {
        let column = Column::labels("sex", &["M", "F", "M"]);
        assert_eq!(observed_range(&column), "F → M");
    }

    #[test]
    fn empty_columns_have_no_range() {
        assert_eq!(observed_range(&Column::numeric("x", vec![None])), "n/a");
        assert_eq!(observed_range(&Column::categorical("y", vec![None])), "n/a");
    }

    #[test]
    fn headline_takes_largest_class_importance() {
        let feature = FeatureImportance {
            feature: "age".to_string(),
            importance: vec![0.02, 0.12, 0.07],
            range: "n/a".to_string(),
        };
        assert_eq!(feature.headline(), 0.12);
    }
}
