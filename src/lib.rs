//! voxserve: long-form text-to-speech and transcription as one HTTP service.
//!
//! The synthesis path splits text into sentences, packs them into
//! cost-bounded batches, synthesizes each batch in order through the
//! Chatterbox engine, and reassembles the staged waveforms into one
//! continuous take. The transcription path feeds audio through Whisper and
//! collects the segment stream into a normalized transcript. Both engines
//! load lazily, once per process, behind the model lifecycle manager.

pub mod audio;
pub mod config;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod models;
pub mod server;
pub mod synth;
pub mod sys;
pub mod text;
pub mod transcribe;

pub use config::Config;
pub use error::{ModelKind, Result, VoxError};
