use thiserror::Error;

/// Errors emitted by the explainability helpers.
#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("shape mismatch for {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: String,
        expected: usize,
        found: usize,
    },
    #[error("class index {index} out of range for {classes} class(es)")]
    ClassOutOfRange { index: usize, classes: usize },
    #[error("unsupported: {0}")]
    Unsupported(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExplainError {
    pub(crate) fn shape(what: impl Into<String>, expected: usize, found: usize) -> Self {
        ExplainError::ShapeMismatch {
            what: what.into(),
            expected,
            found,
        }
    }
}
