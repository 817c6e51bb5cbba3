//! Transcription pipeline: engine invocation and result collection.

pub mod collector;

pub use collector::{transcribe_file, Transcript, TranscriptSegment, TranscriptWord};
