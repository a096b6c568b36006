use std::cmp::Ordering;

use thiserror::Error;

/// Failure to compute a KS statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KsError {
    #[error("sample {0} is empty")]
    EmptySample(usize),
    #[error("sample {0} contains non-finite values")]
    NonFiniteSample(usize),
}

/// Two-sample Kolmogorov-Smirnov statistic.
///
/// Returns the largest vertical gap between the empirical CDFs of `first`
/// and `second`, in `[0, 1]`. Samples must be non-empty and finite.
pub fn ks_statistic(first: &[f64], second: &[f64]) -> Result<f64, KsError> {
    let first = sorted_sample(first, 0)?;
    let second = sorted_sample(second, 1)?;

    let n1 = first.len() as f64;
    let n2 = second.len() as f64;
    let (mut i, mut j) = (0usize, 0usize);
    let mut max_gap = 0.0_f64;

    while i < first.len() && j < second.len() {
        let x = if first[i] <= second[j] {
            first[i]
        } else {
            second[j]
        };
        // Ties move both cursors so each CDF is evaluated after the step.
        while i < first.len() && first[i] <= x {
            i += 1;
        }
        while j < second.len() && second[j] <= x {
            j += 1;
        }
        let gap = (i as f64 / n1 - j as f64 / n2).abs();
        max_gap = max_gap.max(gap);
    }

    Ok(max_gap.clamp(0.0, 1.0))
}

fn sorted_sample(sample: &[f64], index: usize) -> Result<Vec<f64>, KsError> {
    if sample.is_empty() {
        return Err(KsError::EmptySample(index));
    }
    if sample.iter().any(|value| !value.is_finite()) {
        return Err(KsError::NonFiniteSample(index));
    }
    let mut sorted = sample.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    Ok(sorted)
}
