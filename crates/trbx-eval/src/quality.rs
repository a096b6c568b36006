use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use trbx_core::{Column, Dataset};

use crate::ks::{ks_statistic, KsError};

/// Which input a column failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Real,
    Synthetic,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Real => f.write_str("real"),
            Side::Synthetic => f.write_str("synthetic"),
        }
    }
}

/// Why a column could not be scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", content = "side", rename_all = "snake_case")]
pub enum ColumnFailure {
    #[error("column missing from {0} data")]
    MissingColumn(Side),
    #[error("column is not numeric in {0} data")]
    NonNumeric(Side),
    #[error("no values left in {0} data after dropping missing cells")]
    Empty(Side),
    #[error("non-finite values in {0} data")]
    NonFinite(Side),
}

/// KS statistic rounded to 4 decimals, or the reason it is unavailable.
pub type ColumnScore = Result<f64, ColumnFailure>;

/// Score of a single evaluated column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnQuality {
    pub column: String,
    pub score: ColumnScore,
}

impl ColumnQuality {
    pub fn is_available(&self) -> bool {
        self.score.is_ok()
    }
}

/// Per-column scores plus the aggregate reliability score.
///
/// Columns keep the order of the real dataset. The aggregate is the mean of
/// the available scores only and is `None` when no column could be scored.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport {
    columns: Vec<ColumnQuality>,
    aggregate: Option<f64>,
}

impl QualityReport {
    /// Build a report from per-column scores, computing the aggregate.
    pub fn from_scores<I, S>(scores: I) -> Self
    where
        I: IntoIterator<Item = (S, ColumnScore)>,
        S: Into<String>,
    {
        let columns: Vec<ColumnQuality> = scores
            .into_iter()
            .map(|(column, score)| ColumnQuality {
                column: column.into(),
                score,
            })
            .collect();
        let aggregate = aggregate_scores(&columns);
        Self { columns, aggregate }
    }

    pub fn columns(&self) -> &[ColumnQuality] {
        &self.columns
    }

    pub fn score(&self, column: &str) -> Option<&ColumnScore> {
        self.columns
            .iter()
            .find(|entry| entry.column == column)
            .map(|entry| &entry.score)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.score(column).is_some()
    }

    /// Mean of the available column scores, rounded to 4 decimals.
    pub fn aggregate(&self) -> Option<f64> {
        self.aggregate
    }

    pub fn available_count(&self) -> usize {
        self.columns.iter().filter(|entry| entry.is_available()).count()
    }

    pub fn unavailable(&self) -> impl Iterator<Item = (&str, ColumnFailure)> {
        self.columns.iter().filter_map(|entry| match entry.score {
            Ok(_) => None,
            Err(failure) => Some((entry.column.as_str(), failure)),
        })
    }
}

/// Compare `synthetic` against `real`, column by column.
///
/// Every column of `real` not named in `discrete_columns` gets exactly one
/// entry. A column that cannot be scored is recorded as a [`ColumnFailure`]
/// and never aborts the rest of the report.
pub fn evaluate_quality(
    real: &Dataset,
    synthetic: &Dataset,
    discrete_columns: &BTreeSet<String>,
) -> QualityReport {
    let scores = real
        .columns()
        .iter()
        .filter(|column| !discrete_columns.contains(&column.name))
        .map(|column| {
            let score = score_column(column, synthetic.column(&column.name));
            (column.name.clone(), score)
        });
    QualityReport::from_scores(scores)
}

/// Round to 4 decimal digits, half to even.
///
/// The decision is taken on the exact binary value: `0.03125` is a true tie
/// and becomes `0.0312`, while `0.12345` sits slightly above its midpoint
/// and becomes `0.1235`.
pub fn round_score(value: f64) -> f64 {
    let scaled = value * 10_000.0;
    let rounded = if (scaled - scaled.trunc()).abs() == 0.5 {
        // Residual of the product is exact under fma; its sign says which
        // side of the midpoint `value` really lies on.
        let residual = value.mul_add(10_000.0, -scaled);
        if residual == 0.0 {
            scaled.round_ties_even()
        } else if (residual > 0.0) == (scaled > 0.0) {
            scaled.round()
        } else {
            scaled.trunc()
        }
    } else {
        scaled.round()
    };
    rounded / 10_000.0
}

fn score_column(real: &Column, synthetic: Option<&Column>) -> ColumnScore {
    let real_values = real
        .numeric_values()
        .ok_or(ColumnFailure::NonNumeric(Side::Real))?;
    let synthetic = synthetic.ok_or(ColumnFailure::MissingColumn(Side::Synthetic))?;
    let synthetic_values = synthetic
        .numeric_values()
        .ok_or(ColumnFailure::NonNumeric(Side::Synthetic))?;

    ks_statistic(&real_values, &synthetic_values)
        .map(round_score)
        .map_err(|err| match err {
            KsError::EmptySample(0) => ColumnFailure::Empty(Side::Real),
            KsError::EmptySample(_) => ColumnFailure::Empty(Side::Synthetic),
            KsError::NonFiniteSample(0) => ColumnFailure::NonFinite(Side::Real),
            KsError::NonFiniteSample(_) => ColumnFailure::NonFinite(Side::Synthetic),
        })
}

fn aggregate_scores(columns: &[ColumnQuality]) -> Option<f64> {
    let available: Vec<f64> = columns
        .iter()
        .filter_map(|entry| entry.score.ok())
        .collect();
    if available.is_empty() {
        return None;
    }
    let mean = available.iter().sum::<f64>() / available.len() as f64;
    Some(round_score(mean))
}
