use crate::errors::ExplainError;

/// Dense rows × features matrix of attribution values (row-major).
#[derive(Debug, Clone, PartialEq)]
pub struct AttributionMatrix {
    rows: usize,
    features: usize,
    values: Vec<f64>,
}

impl AttributionMatrix {
    pub fn new(rows: usize, features: usize, values: Vec<f64>) -> Result<Self, ExplainError> {
        if values.len() != rows * features {
            return Err(ExplainError::shape(
                "attribution matrix cells",
                rows * features,
                values.len(),
            ));
        }
        Ok(Self {
            rows,
            features,
            values,
        })
    }

    /// Build from nested rows; every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, ExplainError> {
        let features = rows.first().map(Vec::len).unwrap_or(0);
        let row_count = rows.len();
        let mut values = Vec::with_capacity(row_count * features);
        for row in rows {
            if row.len() != features {
                return Err(ExplainError::shape("attribution row", features, row.len()));
            }
            values.extend(row);
        }
        Self::new(row_count, features, values)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn features(&self) -> usize {
        self.features
    }

    pub fn get(&self, row: usize, feature: usize) -> Option<f64> {
        if row >= self.rows || feature >= self.features {
            return None;
        }
        self.values.get(row * self.features + feature).copied()
    }

    /// Values of one feature across all rows.
    pub fn feature_values(&self, feature: usize) -> Vec<f64> {
        if feature >= self.features {
            return Vec::new();
        }
        (0..self.rows)
            .map(|row| self.values[row * self.features + feature])
            .collect()
    }

    /// Mean absolute value per feature.
    pub fn mean_abs(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.features];
        for row in self.values.chunks(self.features.max(1)) {
            for (sum, value) in sums.iter_mut().zip(row) {
                *sum += value.abs();
            }
        }
        let rows = self.rows.max(1) as f64;
        sums.into_iter().map(|sum| sum / rows).collect()
    }
}

/// Attribution values as returned by a tree explainer.
///
/// Binary classifiers and regressors yield one matrix; multiclass models
/// yield one matrix per class, in class order.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribution {
    Single(AttributionMatrix),
    PerClass(Vec<AttributionMatrix>),
}

impl Attribution {
    /// Build a per-class attribution, checking that every class shares one shape.
    pub fn per_class(matrices: Vec<AttributionMatrix>) -> Result<Self, ExplainError> {
        let Some(first) = matrices.first() else {
            return Err(ExplainError::InvalidInput(
                "per-class attribution without classes".to_string(),
            ));
        };
        let (rows, features) = (first.rows(), first.features());
        for matrix in &matrices {
            if matrix.rows() != rows {
                return Err(ExplainError::shape("per-class rows", rows, matrix.rows()));
            }
            if matrix.features() != features {
                return Err(ExplainError::shape(
                    "per-class features",
                    features,
                    matrix.features(),
                ));
            }
        }
        Ok(Attribution::PerClass(matrices))
    }

    pub fn matrices(&self) -> Vec<&AttributionMatrix> {
        match self {
            Attribution::Single(matrix) => vec![matrix],
            Attribution::PerClass(matrices) => matrices.iter().collect(),
        }
    }

    pub fn class_count(&self) -> usize {
        match self {
            Attribution::Single(_) => 1,
            Attribution::PerClass(matrices) => matrices.len(),
        }
    }

    /// Matrix for `class_idx`; a single matrix is returned for any index.
    pub fn class(&self, class_idx: usize) -> Result<&AttributionMatrix, ExplainError> {
        match self {
            Attribution::Single(matrix) => Ok(matrix),
            Attribution::PerClass(matrices) => {
                matrices
                    .get(class_idx)
                    .ok_or(ExplainError::ClassOutOfRange {
                        index: class_idx,
                        classes: matrices.len(),
                    })
            }
        }
    }

    /// `(rows, features)` shared by all matrices.
    pub fn shape(&self) -> (usize, usize) {
        let matrix = match self {
            Attribution::Single(matrix) => Some(matrix),
            Attribution::PerClass(matrices) => matrices.first(),
        };
        matrix
            .map(|matrix| (matrix.rows(), matrix.features()))
            .unwrap_or((0, 0))
    }

    /// Labels used for importance columns: `importance` or `class_<i>`.
    pub fn labels(&self) -> Vec<String> {
        match self {
            Attribution::Single(_) => vec!["importance".to_string()],
            Attribution::PerClass(matrices) => (0..matrices.len())
                .map(|idx| format!("class_{idx}"))
                .collect(),
        }
    }
}

/// Dense rows × features × features tensor of interaction values.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionTensor {
    rows: usize,
    features: usize,
    values: Vec<f64>,
}

impl InteractionTensor {
    pub fn new(rows: usize, features: usize, values: Vec<f64>) -> Result<Self, ExplainError> {
        let expected = rows * features * features;
        if values.len() != expected {
            return Err(ExplainError::shape(
                "interaction tensor cells",
                expected,
                values.len(),
            ));
        }
        Ok(Self {
            rows,
            features,
            values,
        })
    }

    pub fn from_nested(rows: Vec<Vec<Vec<f64>>>) -> Result<Self, ExplainError> {
        let features = rows.first().map(Vec::len).unwrap_or(0);
        let row_count = rows.len();
        let mut values = Vec::with_capacity(row_count * features * features);
        for row in rows {
            if row.len() != features {
                return Err(ExplainError::shape("interaction row", features, row.len()));
            }
            for inner in row {
                if inner.len() != features {
                    return Err(ExplainError::shape(
                        "interaction row",
                        features,
                        inner.len(),
                    ));
                }
                values.extend(inner);
            }
        }
        Self::new(row_count, features, values)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn features(&self) -> usize {
        self.features
    }

    /// Mean absolute interaction, as a features × features row-major matrix.
    pub fn mean_abs(&self) -> Vec<f64> {
        let cells = self.features * self.features;
        let mut sums = vec![0.0; cells];
        for row in self.values.chunks(cells.max(1)) {
            for (sum, value) in sums.iter_mut().zip(row) {
                *sum += value.abs();
            }
        }
        let rows = self.rows.max(1) as f64;
        sums.into_iter().map(|sum| sum / rows).collect()
    }
}

/// Interaction values: one tensor, or one per class.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionAttribution {
    Single(InteractionTensor),
    PerClass(Vec<InteractionTensor>),
}

impl InteractionAttribution {
    pub fn tensors(&self) -> Vec<&InteractionTensor> {
        match self {
            InteractionAttribution::Single(tensor) => vec![tensor],
            InteractionAttribution::PerClass(tensors) => tensors.iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_abs_is_column_wise() {
        let matrix =
            AttributionMatrix::from_rows(vec![vec![1.0, -2.0], vec![-3.0, 4.0]]).expect("matrix");
        assert_eq!(matrix.mean_abs(), vec![2.0, 3.0]);
        assert_eq!(matrix.feature_values(1), vec![-2.0, 4.0]);
        assert_eq!(matrix.get(1, 0), Some(-3.0));
        assert_eq!(matrix.get(2, 0), None);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = AttributionMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, ExplainError::ShapeMismatch { .. }));
    }

    #[test]
    fn per_class_requires_consistent_shapes() {
        let a = AttributionMatrix::from_rows(vec![vec![1.0, 2.0]]).expect("a");
        let b = AttributionMatrix::from_rows(vec![vec![1.0]]).expect("b");
        assert!(Attribution::per_class(vec![a.clone(), b]).is_err());
        assert!(Attribution::per_class(Vec::new()).is_err());

        let attribution = Attribution::per_class(vec![a.clone(), a]).expect("per class");
        assert_eq!(attribution.class_count(), 2);
        assert_eq!(attribution.shape(), (1, 2));
        assert_eq!(attribution.labels(), vec!["class_0", "class_1"]);
        assert!(matches!(
            attribution.class(2),
            Err(ExplainError::ClassOutOfRange {
                index: 2,
                classes: 2
            })
        ));
    }

    #[test]
    fn interaction_mean_abs() {
        let tensor = InteractionTensor::from_nested(vec![
            vec![vec![1.0, -0.5], vec![-0.5, 2.0]],
            vec![vec![3.0, 1.5], vec![1.5, -2.0]],
        ])
        .expect("tensor");
        assert_eq!(tensor.mean_abs(), vec![2.0, 1.0, 1.0, 2.0]);
    }
}
