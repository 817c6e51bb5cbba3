//! Synthesis orchestration.
//!
//! Runs the planned batches through the engine strictly in order. The
//! engine is not safe for overlapping calls and the GPU serializes them
//! anyway, so there is nothing to gain from concurrency here.
//!
//! Each batch's waveform is staged to disk immediately after production;
//! a one-hour audiobook chapter would otherwise hold every segment in
//! memory at once. The staging directory is request-scoped and removed on
//! every exit path.

use crate::audio::{reassemble, wav, AudioSegment, FinalAudio};
use crate::engine::{SynthesisOptions, Synthesizer};
use crate::error::Result;
use crate::text::{plan_batches, split_sentences, TextBatch};

/// Synthesize the planned batches and reassemble the result at the
/// engine's native rate.
///
/// Aborts on the first failed batch; there is no partial-success mode and
/// no per-batch retry.
pub fn synthesize_batches(
    engine: &dyn Synthesizer,
    batches: &[TextBatch],
    options: &SynthesisOptions,
) -> Result<FinalAudio> {
    let target_rate = engine.sample_rate();
    let staging = tempfile::tempdir()?;
    let mut staged_paths = Vec::with_capacity(batches.len());

    for (index, batch) in batches.iter().enumerate() {
        log::debug!(
            "synthesizing batch {}/{} ({} sentences, ~{} tokens)",
            index + 1,
            batches.len(),
            batch.sentences().len(),
            batch.estimated_tokens()
        );

        let segment = engine.synthesize(&batch.text(), options)?;
        let path = staging.path().join(format!("batch-{:04}.wav", index));
        wav::write_wav_file(&path, &segment)?;
        staged_paths.push(path);
    }

    let mut segments: Vec<AudioSegment> = Vec::with_capacity(staged_paths.len());
    for path in &staged_paths {
        segments.push(wav::read_wav_file(path)?);
    }

    // Staging directory drops here, removing the per-batch files.
    Ok(reassemble(&segments, target_rate))
}

/// Full text-to-waveform pipeline: segment, plan, synthesize, reassemble.
pub fn synthesize_text(
    engine: &dyn Synthesizer,
    text: &str,
    options: &SynthesisOptions,
    max_speech_tokens: u32,
) -> Result<FinalAudio> {
    let sentences = split_sentences(text);
    let batches = plan_batches(sentences, max_speech_tokens, options.cfg_weight);
    log::info!(
        "planned {} batch(es) for {} chars of text",
        batches.len(),
        text.len()
    );
    synthesize_batches(engine, &batches, options)
}
