use std::path::Path;

use serde::{Deserialize, Serialize};
use trbx_core::Dataset;

use crate::attribution::{
    Attribution, AttributionMatrix, InteractionAttribution, InteractionTensor,
};
use crate::errors::ExplainError;

/// Source of attribution values for a trained tree model.
pub trait TreeExplainer {
    /// Per-sample, per-feature attribution values for `data`.
    fn shap_values(&self, data: &Dataset) -> Result<Attribution, ExplainError>;

    /// Pairwise feature interaction values for `data`.
    fn shap_interaction_values(&self, data: &Dataset)
        -> Result<InteractionAttribution, ExplainError>;
}

/// Attribution values exported from an external explainer run.
///
/// `shap_values` is either a rows × features array (binary/regression) or a
/// classes × rows × features array (multiclass); `interaction_values` adds
/// one more features axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributionExport {
    pub feature_names: Vec<String>,
    pub shap_values: RawAttribution,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_values: Option<RawInteraction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAttribution {
    Single(Vec<Vec<f64>>),
    PerClass(Vec<Vec<Vec<f64>>>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawInteraction {
    Single(Vec<Vec<Vec<f64>>>),
    PerClass(Vec<Vec<Vec<Vec<f64>>>>),
}

impl RawAttribution {
    fn resolve(self) -> Result<Attribution, ExplainError> {
        match self {
            RawAttribution::Single(rows) => Ok(Attribution::Single(AttributionMatrix::from_rows(
                rows,
            )?)),
            RawAttribution::PerClass(classes) => Attribution::per_class(
                classes
                    .into_iter()
                    .map(AttributionMatrix::from_rows)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        }
    }
}

impl RawInteraction {
    fn resolve(self) -> Result<InteractionAttribution, ExplainError> {
        match self {
            RawInteraction::Single(rows) => Ok(InteractionAttribution::Single(
                InteractionTensor::from_nested(rows)?,
            )),
            RawInteraction::PerClass(classes) => Ok(InteractionAttribution::PerClass(
                classes
                    .into_iter()
                    .map(InteractionTensor::from_nested)
                    .collect::<Result<Vec<_>, _>>()?,
            )),
        }
    }
}

/// [`TreeExplainer`] serving values computed ahead of time.
#[derive(Debug, Clone)]
pub struct PrecomputedExplainer {
    feature_names: Vec<String>,
    attribution: Attribution,
    interactions: Option<InteractionAttribution>,
}

impl PrecomputedExplainer {
    pub fn new(
        feature_names: Vec<String>,
        attribution: Attribution,
        interactions: Option<InteractionAttribution>,
    ) -> Result<Self, ExplainError> {
        let (_, features) = attribution.shape();
        if features != feature_names.len() {
            return Err(ExplainError::shape(
                "attribution features",
                feature_names.len(),
                features,
            ));
        }
        if let Some(interactions) = &interactions {
            for tensor in interactions.tensors() {
                if tensor.features() != feature_names.len() {
                    return Err(ExplainError::shape(
                        "interaction features",
                        feature_names.len(),
                        tensor.features(),
                    ));
                }
            }
        }
        Ok(Self {
            feature_names,
            attribution,
            interactions,
        })
    }

    pub fn from_export(export: AttributionExport) -> Result<Self, ExplainError> {
        let attribution = export.shap_values.resolve()?;
        let interactions = export
            .interaction_values
            .map(RawInteraction::resolve)
            .transpose()?;
        Self::new(export.feature_names, attribution, interactions)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ExplainError> {
        let export: AttributionExport = serde_json::from_str(json)?;
        Self::from_export(export)
    }

    pub fn from_path(path: &Path) -> Result<Self, ExplainError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn check_data(&self, data: &Dataset, rows: usize) -> Result<(), ExplainError> {
        let names = data.column_names();
        if names.len() != self.feature_names.len() {
            return Err(ExplainError::shape(
                "data columns",
                self.feature_names.len(),
                names.len(),
            ));
        }
        if let Some((expected, found)) = self
            .feature_names
            .iter()
            .zip(&names)
            .find(|(expected, found)| expected.as_str() != **found)
        {
            return Err(ExplainError::InvalidInput(format!(
                "data column '{found}' does not match exported feature '{expected}'"
            )));
        }
        if data.row_count() != rows {
            return Err(ExplainError::shape("data rows", rows, data.row_count()));
        }
        Ok(())
    }
}

impl TreeExplainer for PrecomputedExplainer {
    fn shap_values(&self, data: &Dataset) -> Result<Attribution, ExplainError> {
        let (rows, _) = self.attribution.shape();
        self.check_data(data, rows)?;
        Ok(self.attribution.clone())
    }

    fn shap_interaction_values(
        &self,
        data: &Dataset,
    ) -> Result<InteractionAttribution, ExplainError> {
        let interactions = self.interactions.as_ref().ok_or_else(|| {
            ExplainError::Unsupported("export carries no interaction values".to_string())
        })?;
        let rows = interactions
            .tensors()
            .first()
            .map(|tensor| tensor.rows())
            .unwrap_or(0);
        self.check_data(data, rows)?;
        Ok(interactions.clone())
    }
}
