use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::PI;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;
use trbx_core::{Column, ColumnKind, ColumnValues, Dataset};

use crate::errors::GenerationError;
use crate::synthesizer::{Synthesizer, SynthesizerConfig};

/// Column-wise generative model.
///
/// Continuous columns are sampled with a smoothed bootstrap (an observed
/// value plus Gaussian kernel noise, Silverman bandwidth); discrete columns
/// are drawn from their observed category frequencies. Columns are modelled
/// independently, so cross-column correlations are not reproduced.
#[derive(Debug, Clone)]
pub struct MarginalSynthesizer {
    config: SynthesizerConfig,
    columns: Vec<FittedColumn>,
    fitted: bool,
}

#[derive(Debug, Clone)]
struct FittedColumn {
    name: String,
    kind: ColumnKind,
    missing_rate: f64,
    model: ColumnModel,
    rng: ChaCha8Rng,
}

#[derive(Debug, Clone)]
enum ColumnModel {
    Continuous {
        values: Vec<f64>,
        bandwidth: f64,
        min: f64,
        max: f64,
        integral: bool,
    },
    Discrete {
        categories: Vec<(Category, u64)>,
        total: u64,
    },
    /// Every observed cell was missing.
    Missing,
}

#[derive(Debug, Clone, PartialEq)]
enum Category {
    Number(f64),
    Text(String),
}

enum Draw {
    Missing,
    Number(f64),
    Text(String),
}

impl MarginalSynthesizer {
    pub fn new(config: SynthesizerConfig) -> Self {
        Self {
            config,
            columns: Vec::new(),
            fitted: false,
        }
    }

    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    /// Names of the fitted columns, in sampling order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }
}

impl Synthesizer for MarginalSynthesizer {
    fn untrained(config: &SynthesizerConfig) -> Self {
        Self::new(config.clone())
    }

    fn fit(&mut self, data: &Dataset, discrete: &BTreeSet<String>) -> Result<(), GenerationError> {
        if data.is_empty() {
            return Err(GenerationError::InvalidInput(
                "cannot fit on a dataset without columns".to_string(),
            ));
        }
        if data.row_count() == 0 {
            return Err(GenerationError::InvalidInput(
                "cannot fit on a dataset without rows".to_string(),
            ));
        }
        if let Some(unknown) = discrete.iter().find(|name| !data.has_column(name)) {
            return Err(GenerationError::InvalidInput(format!(
                "discrete column '{unknown}' not found in data"
            )));
        }
        if !(self.config.smoothing.is_finite() && self.config.smoothing >= 0.0) {
            return Err(GenerationError::Fit(format!(
                "smoothing must be a non-negative number, got {}",
                self.config.smoothing
            )));
        }

        let mut columns = Vec::with_capacity(data.column_count());
        for column in data.columns() {
            let is_discrete = discrete.contains(&column.name);
            let fitted = fit_column(column, is_discrete, &self.config);
            debug!(
                column = %fitted.name,
                discrete = is_discrete,
                missing_rate = fitted.missing_rate,
                "column fitted"
            );
            columns.push(fitted);
        }

        self.columns = columns;
        self.fitted = true;
        Ok(())
    }

    fn sample(&mut self, n: usize) -> Result<Dataset, GenerationError> {
        if !self.fitted {
            return Err(GenerationError::NotFitted);
        }

        let preserve_missing = self.config.preserve_missing;
        let columns = self
            .columns
            .iter_mut()
            .map(|column| column.sample(n, preserve_missing))
            .collect();
        Ok(Dataset::new(columns)?)
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }
}

impl FittedColumn {
    fn sample(&mut self, n: usize, preserve_missing: bool) -> Column {
        let draws: Vec<Draw> = (0..n).map(|_| self.draw(preserve_missing)).collect();
        match self.kind {
            ColumnKind::Numeric => Column::numeric(
                self.name.clone(),
                draws
                    .into_iter()
                    .map(|draw| match draw {
                        Draw::Number(value) => Some(value),
                        Draw::Missing | Draw::Text(_) => None,
                    })
                    .collect(),
            ),
            ColumnKind::Categorical => Column::categorical(
                self.name.clone(),
                draws
                    .into_iter()
                    .map(|draw| match draw {
                        Draw::Text(value) => Some(value),
                        Draw::Missing | Draw::Number(_) => None,
                    })
                    .collect(),
            ),
        }
    }

    fn draw(&mut self, preserve_missing: bool) -> Draw {
        if preserve_missing
            && self.missing_rate > 0.0
            && self.rng.random_bool(self.missing_rate.clamp(0.0, 1.0))
        {
            return Draw::Missing;
        }

        match &self.model {
            ColumnModel::Missing => Draw::Missing,
            ColumnModel::Continuous {
                values,
                bandwidth,
                min,
                max,
                integral,
            } => {
                let base = values[self.rng.random_range(0..values.len())];
                let mut value = if *bandwidth > 0.0 {
                    base + bandwidth * standard_normal(&mut self.rng)
                } else {
                    base
                };
                value = value.clamp(*min, *max);
                if *integral {
                    value = value.round();
                }
                Draw::Number(value)
            }
            ColumnModel::Discrete { categories, total } => {
                let mut target = self.rng.random_range(0..*total);
                for (category, count) in categories {
                    if target < *count {
                        return match category {
                            Category::Number(value) => Draw::Number(*value),
                            Category::Text(value) => Draw::Text(value.clone()),
                        };
                    }
                    target -= count;
                }
                Draw::Missing
            }
        }
    }
}

fn fit_column(column: &Column, is_discrete: bool, config: &SynthesizerConfig) -> FittedColumn {
    let rows = column.len().max(1) as f64;
    let missing_rate = column.values.null_count() as f64 / rows;
    let rng = ChaCha8Rng::seed_from_u64(hash_seed(config.seed, &column.name));

    let model = match &column.values {
        ColumnValues::Numeric(values) if is_discrete => {
            let mut counts: BTreeMap<u64, (f64, u64)> = BTreeMap::new();
            for value in values.iter().flatten() {
                counts.entry(value.to_bits()).or_insert((*value, 0)).1 += 1;
            }
            let mut categories: Vec<(Category, u64)> = counts
                .into_values()
                .map(|(value, count)| (Category::Number(value), count))
                .collect();
            categories.sort_by(|a, b| match (&a.0, &b.0) {
                (Category::Number(x), Category::Number(y)) => {
                    x.partial_cmp(y).unwrap_or(Ordering::Equal)
                }
                _ => Ordering::Equal,
            });
            discrete_model(categories)
        }
        ColumnValues::Numeric(values) => {
            let mut observed: Vec<f64> = values
                .iter()
                .flatten()
                .copied()
                .filter(|value| value.is_finite())
                .collect();
            if observed.is_empty() {
                ColumnModel::Missing
            } else {
                observed.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
                let min = observed[0];
                let max = observed[observed.len() - 1];
                let integral = observed.iter().all(|value| value.fract() == 0.0);
                let bandwidth = silverman_bandwidth(&observed) * config.smoothing;
                ColumnModel::Continuous {
                    values: observed,
                    bandwidth,
                    min,
                    max,
                    integral,
                }
            }
        }
        ColumnValues::Categorical(values) => {
            let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
            for value in values.iter().flatten() {
                *counts.entry(value.as_str()).or_insert(0) += 1;
            }
            discrete_model(
                counts
                    .into_iter()
                    .map(|(value, count)| (Category::Text(value.to_string()), count))
                    .collect(),
            )
        }
    };

    FittedColumn {
        name: column.name.clone(),
        kind: column.kind(),
        missing_rate,
        model,
        rng,
    }
}

fn discrete_model(categories: Vec<(Category, u64)>) -> ColumnModel {
    let total: u64 = categories.iter().map(|(_, count)| count).sum();
    if total == 0 {
        ColumnModel::Missing
    } else {
        ColumnModel::Discrete { categories, total }
    }
}

/// Silverman's rule of thumb: `1.06 * sigma * n^(-1/5)`.
fn silverman_bandwidth(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / (n - 1.0);
    1.06 * variance.sqrt() * n.powf(-0.2)
}

/// Box-Muller transform.
fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
