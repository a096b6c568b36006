use std::cmp::Ordering;

use serde::Serialize;
use trbx_core::Dataset;

use crate::attribution::InteractionAttribution;
use crate::errors::ExplainError;
use crate::explainer::TreeExplainer;

/// Default number of pairs kept per class.
pub const DEFAULT_MAX_DISPLAY: usize = 10;

/// Mean absolute interaction of one feature pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionPair {
    pub first: String,
    pub second: String,
    pub mean_abs: f64,
}

/// Strongest interactions for one class (or the single output).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassInteractions {
    pub label: String,
    pub pairs: Vec<InteractionPair>,
}

/// Rank the unordered feature pairs of `data` by mean absolute interaction.
pub fn interaction_summary<E: TreeExplainer + ?Sized>(
    explainer: &E,
    data: &Dataset,
    max_display: usize,
) -> Result<Vec<ClassInteractions>, ExplainError> {
    if data.is_empty() {
        return Err(ExplainError::InvalidInput(
            "data has no columns".to_string(),
        ));
    }

    let interactions = explainer.shap_interaction_values(data)?;
    let names = data.column_names();
    let tensors = interactions.tensors();
    let single = matches!(interactions, InteractionAttribution::Single(_));

    tensors
        .iter()
        .enumerate()
        .map(|(class_idx, tensor)| {
            if tensor.features() != names.len() {
                return Err(ExplainError::shape(
                    "interaction features",
                    names.len(),
                    tensor.features(),
                ));
            }
            let means = tensor.mean_abs();
            let features = tensor.features();
            let mut pairs = Vec::new();
            for i in 0..features {
                for j in (i + 1)..features {
                    pairs.push(InteractionPair {
                        first: names[i].to_string(),
                        second: names[j].to_string(),
                        mean_abs: means[i * features + j],
                    });
                }
            }
            pairs.sort_by(|a, b| {
                b.mean_abs
                    .partial_cmp(&a.mean_abs)
                    .unwrap_or(Ordering::Equal)
            });
            pairs.truncate(max_display);

            let label = if single {
                "all".to_string()
            } else {
                format!("class_{class_idx}")
            };
            Ok(ClassInteractions { label, pairs })
        })
        .collect()
}
