//! Attribution-based explainability helpers for tree models.
//!
//! Attribution values come from an external explainer behind the
//! [`TreeExplainer`] trait; this crate summarizes them into per-feature
//! importance, interaction rankings, value distributions and narrative
//! sentences.

pub mod attribution;
pub mod distribution;
pub mod errors;
pub mod explainer;
pub mod importance;
pub mod interactions;
pub mod narrative;

pub use attribution::{Attribution, AttributionMatrix, InteractionAttribution, InteractionTensor};
pub use distribution::{top_feature_distributions, FeatureDistribution, DEFAULT_TOP_N};
pub use errors::ExplainError;
pub use explainer::{AttributionExport, PrecomputedExplainer, TreeExplainer};
pub use importance::{feature_importance, FeatureImportance, ShapSummary};
pub use interactions::{
    interaction_summary, ClassInteractions, InteractionPair, DEFAULT_MAX_DISPLAY,
};
pub use narrative::{narrative_report, Strength, DEFAULT_CLASS_NAME};
