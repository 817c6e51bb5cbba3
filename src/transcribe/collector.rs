//! Transcription collection.
//!
//! The recognition engine hands back a lazy, single-pass segment stream.
//! The collector drains it exactly once, normalizing on the way through:
//! ids by arrival order, times rounded to millisecond precision, text
//! trimmed, word probabilities rounded to four decimals.

use crate::engine::{RecognitionOptions, RecognitionOutput, Recognizer};
use crate::error::Result;
use serde::Serialize;
use std::path::Path;

/// One word with millisecond-precision timing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptWord {
    pub start: f64,
    pub end: f64,
    pub word: String,
    pub probability: f64,
}

/// One normalized transcript segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptSegment {
    /// Arrival position in the engine's output stream, 0-based.
    pub id: usize,
    pub start: f64,
    pub end: f64,
    pub text: String,
    /// Empty when word timestamps were not requested or not produced.
    pub words: Vec<TranscriptWord>,
}

/// The full normalized transcription result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcript {
    pub language: String,
    pub language_probability: f64,
    pub duration_seconds: f64,
    pub segments: Vec<TranscriptSegment>,
}

fn round_ms(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

fn round_probability(p: f64) -> f64 {
    (p * 10_000.0).round() / 10_000.0
}

/// Drain one engine invocation into a [`Transcript`].
///
/// The stream in `output` cannot be re-iterated; this consumes it.
pub fn collect(output: RecognitionOutput) -> Result<Transcript> {
    let mut segments = Vec::new();

    for (id, raw) in output.segments.enumerate() {
        let raw = raw?;
        let words = raw
            .words
            .unwrap_or_default()
            .into_iter()
            .map(|w| TranscriptWord {
                start: round_ms(w.start),
                end: round_ms(w.end),
                word: w.word,
                probability: round_probability(w.probability),
            })
            .collect();

        segments.push(TranscriptSegment {
            id,
            start: round_ms(raw.start),
            end: round_ms(raw.end),
            text: raw.text.trim().to_string(),
            words,
        });
    }

    // Engines may not report overall duration; fall back to the last
    // segment's end, or zero for silence.
    let duration_seconds = output
        .info
        .duration
        .unwrap_or_else(|| segments.last().map(|s| s.end).unwrap_or(0.0));

    Ok(Transcript {
        language: output.info.language,
        language_probability: round_probability(output.info.language_probability),
        duration_seconds,
        segments,
    })
}

/// Transcribe the WAV file at `audio_path` with the given engine.
pub fn transcribe_file(
    engine: &dyn Recognizer,
    audio_path: &Path,
    options: &RecognitionOptions,
) -> Result<Transcript> {
    let output = engine.recognize(audio_path, options)?;
    collect(output)
}
