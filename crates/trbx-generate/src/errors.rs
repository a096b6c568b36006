use thiserror::Error;

/// Errors emitted by the generation engine and synthesizers.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("model is not fitted")]
    NotFitted,
    #[error("model fit failed: {0}")]
    Fit(String),
    #[error("core error: {0}")]
    Core(#[from] trbx_core::Error),
}
