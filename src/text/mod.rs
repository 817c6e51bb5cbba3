//! Text segmentation and batch planning for long-form synthesis.
//!
//! The synthesis engine can only handle a bounded amount of text per call.
//! This module splits raw text into sentences, estimates each sentence's
//! synthesis cost in speech tokens, and greedily packs sentences into
//! cost-bounded batches that preserve reading order.

pub mod budget;
pub mod planner;
pub mod segmenter;

pub use planner::{plan_batches, TextBatch};
pub use segmenter::split_sentences;
