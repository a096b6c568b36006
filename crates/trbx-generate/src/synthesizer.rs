use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use trbx_core::Dataset;

use crate::errors::GenerationError;

/// Settings used when a generation run has to train a fresh model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SynthesizerConfig {
    /// Seed for the model's random number generator.
    pub seed: u64,
    /// Multiplier applied to the kernel bandwidth of continuous columns.
    /// `0.0` resamples observed values verbatim.
    pub smoothing: f64,
    /// Reproduce the missing-value rate of each column.
    pub preserve_missing: bool,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            smoothing: 1.0,
            preserve_missing: true,
        }
    }
}

/// A generative tabular model: fitted once, sampled any number of times.
pub trait Synthesizer {
    /// A fresh, unfitted model.
    fn untrained(config: &SynthesizerConfig) -> Self
    where
        Self: Sized;

    /// Learn the distribution of `data`; `discrete` names the columns to
    /// model as categories.
    fn fit(&mut self, data: &Dataset, discrete: &BTreeSet<String>) -> Result<(), GenerationError>;

    /// Draw `n` synthetic rows with the fitted columns.
    fn sample(&mut self, n: usize) -> Result<Dataset, GenerationError>;

    fn is_fitted(&self) -> bool;
}
