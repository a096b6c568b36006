use std::time::Instant;

use tracing::{info, warn};
use trbx_core::Dataset;
use trbx_eval::evaluate_quality;

use crate::errors::GenerationError;
use crate::marginal::MarginalSynthesizer;
use crate::model::{GenerateOptions, GenerationOutput};
use crate::synthesizer::Synthesizer;

/// Entry point for generating synthetic data from a real dataset.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Fit (unless `model` is supplied), sample and optionally evaluate.
    pub fn run<S: Synthesizer>(
        &self,
        real: &Dataset,
        model: Option<S>,
    ) -> Result<GenerationOutput<S>, GenerationError> {
        let start = Instant::now();

        if real.is_empty() {
            return Err(GenerationError::InvalidInput(
                "dataset has no columns".to_string(),
            ));
        }

        let data = match &self.options.target_column {
            Some(target) => real.without_column(target),
            None => real.clone(),
        };
        if data.is_empty() {
            return Err(GenerationError::InvalidInput(
                "no columns left after dropping the target column".to_string(),
            ));
        }

        let discrete_columns = self.options.discrete_columns.resolve(&data);

        info!(
            rows = data.row_count(),
            columns = data.column_count(),
            discrete = discrete_columns.len(),
            n_samples = self.options.n_samples,
            pretrained = model.is_some(),
            "generation started"
        );

        let mut model = match model {
            Some(model) => model,
            None => {
                let fit_start = Instant::now();
                let mut model = S::untrained(&self.options.synthesizer);
                model.fit(&data, &discrete_columns)?;
                info!(
                    duration_ms = fit_start.elapsed().as_millis() as u64,
                    "model fitted"
                );
                model
            }
        };

        let synthetic = model.sample(self.options.n_samples)?;
        info!(rows = synthetic.row_count(), "samples drawn");

        let quality = if self.options.evaluate_quality {
            let report = evaluate_quality(&data, &synthetic, &discrete_columns);
            for (column, failure) in report.unavailable() {
                warn!(column = %column, reason = %failure, "column quality unavailable");
            }
            info!(
                global_score = ?report.aggregate(),
                columns = report.columns().len(),
                "quality evaluated"
            );
            Some(report)
        } else {
            None
        };

        info!(
            duration_ms = start.elapsed().as_millis() as u64,
            "generation completed"
        );

        Ok(GenerationOutput {
            synthetic,
            model: self.options.return_model.then_some(model),
            quality,
            discrete_columns,
        })
    }
}

/// Generate synthetic rows with the built-in [`MarginalSynthesizer`].
pub fn generate_synthetic(
    real: &Dataset,
    options: &GenerateOptions,
) -> Result<GenerationOutput<MarginalSynthesizer>, GenerationError> {
    GenerationEngine::new(options.clone()).run::<MarginalSynthesizer>(real, None)
}
