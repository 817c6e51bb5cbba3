//! Long-form synthesis pipeline.

pub mod orchestrator;

pub use orchestrator::{synthesize_batches, synthesize_text};
