use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use trbx_core::Dataset;
use trbx_eval::QualityReport;

use crate::synthesizer::SynthesizerConfig;

/// How the discrete (categorical) columns of a run are chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DiscreteColumns {
    /// Every categorical column of the input.
    #[default]
    Infer,
    /// Exactly these names.
    Explicit(BTreeSet<String>),
}

impl DiscreteColumns {
    pub fn explicit<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DiscreteColumns::Explicit(names.into_iter().map(Into::into).collect())
    }

    pub fn resolve(&self, data: &Dataset) -> BTreeSet<String> {
        match self {
            DiscreteColumns::Infer => data.categorical_columns(),
            DiscreteColumns::Explicit(names) => names.clone(),
        }
    }
}

/// Options for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GenerateOptions {
    /// Column removed before fitting and evaluation (e.g. the label).
    pub target_column: Option<String>,
    /// Number of synthetic rows to draw.
    pub n_samples: usize,
    pub discrete_columns: DiscreteColumns,
    /// Hand the fitted model back to the caller.
    pub return_model: bool,
    /// Compare synthetic and real data after sampling.
    pub evaluate_quality: bool,
    /// Used only when no pre-trained model is supplied.
    pub synthesizer: SynthesizerConfig,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            target_column: None,
            n_samples: 100,
            discrete_columns: DiscreteColumns::Infer,
            return_model: false,
            evaluate_quality: true,
            synthesizer: SynthesizerConfig::default(),
        }
    }
}

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationOutput<S> {
    pub synthetic: Dataset,
    /// Present when `return_model` was set.
    pub model: Option<S>,
    /// Present when `evaluate_quality` was set.
    pub quality: Option<QualityReport>,
    /// Discrete columns used for fitting and evaluation.
    pub discrete_columns: BTreeSet<String>,
}
