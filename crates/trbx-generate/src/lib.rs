//! Synthetic patient data generation for trbx.
//!
//! A [`Synthesizer`] is fitted on the real dataset and sampled to produce
//! synthetic rows; the [`GenerationEngine`] wires fitting, sampling and the
//! optional quality evaluation together.

pub mod engine;
pub mod errors;
pub mod marginal;
pub mod model;
pub mod synthesizer;

pub use engine::{generate_synthetic, GenerationEngine};
pub use errors::GenerationError;
pub use marginal::MarginalSynthesizer;
pub use model::{DiscreteColumns, GenerateOptions, GenerationOutput};
pub use synthesizer::{Synthesizer, SynthesizerConfig};
