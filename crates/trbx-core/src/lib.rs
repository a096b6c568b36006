//! Core contracts and helpers for trbx.
//!
//! This crate defines the tabular `Dataset` model shared by the quality
//! evaluator, the synthetic data generator and the explainability helpers,
//! plus CSV loading/saving and dataset fingerprints.

pub mod dataset;
pub mod error;
pub mod fingerprint;
pub mod io;
pub mod value;

pub use dataset::{Column, ColumnKind, ColumnValues, Dataset};
pub use error::{Error, Result};
pub use fingerprint::dataset_fingerprint;
pub use io::{read_csv, read_csv_from_reader, write_csv, write_csv_to_writer};
pub use value::Value;
