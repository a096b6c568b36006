use std::fmt;

use crate::importance::ShapSummary;

/// Class name used when the caller does not name the predicted class.
pub const DEFAULT_CLASS_NAME: &str = "the predicted condition";

/// Qualitative contribution level of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strength {
    Strongly,
    Moderately,
    Slightly,
}

impl Strength {
    /// `> 0.1` strongly, `> 0.05` moderately, otherwise slightly.
    pub fn from_importance(importance: f64) -> Self {
        if importance > 0.1 {
            Strength::Strongly
        } else if importance > 0.05 {
            Strength::Moderately
        } else {
            Strength::Slightly
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strength::Strongly => f.write_str("strongly"),
            Strength::Moderately => f.write_str("moderately"),
            Strength::Slightly => f.write_str("slightly"),
        }
    }
}

/// One plain-language sentence per feature, in table order.
pub fn narrative_report(summary: &ShapSummary, class_name: &str) -> Vec<String> {
    summary
        .features
        .iter()
        .map(|feature| {
            let strength = Strength::from_importance(feature.headline());
            format!(
                "Feature '{}' with observed range {} contributes {} to the prediction of {} according to the SHAP model.",
                feature.feature, feature.range, strength, class_name
            )
        })
        .collect()
}
