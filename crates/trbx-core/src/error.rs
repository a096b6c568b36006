use thiserror::Error;

/// Core error type shared across trbx crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The dataset is not well formed (ragged columns, duplicate names, ...).
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Convenience alias for results returned by trbx crates.
pub type Result<T> = std::result::Result<T, Error>;
