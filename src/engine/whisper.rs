//! Whisper-based speech recognition.
//!
//! Implements the Recognizer trait on top of whisper-rs. Requires the
//! `whisper` feature (on by default) and cmake at build time; without it a
//! stub ships that fails every call with a clear message.

use crate::audio::{reassemble, wav};
use crate::defaults;
use crate::engine::recognizer::{
    RawSegment, RawWord, RecognitionInfo, RecognitionOptions, RecognitionOutput, Recognizer,
};
use crate::error::{ModelKind, Result, VoxError};
use std::path::{Path, PathBuf};

#[cfg(feature = "whisper")]
use std::sync::{Mutex, Once};
#[cfg(feature = "whisper")]
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

#[cfg(feature = "whisper")]
static LOGGING_HOOKS_INSTALLED: Once = Once::new();

/// Whisper-backed recognizer.
///
/// The WhisperContext is wrapped in a Mutex; one inference runs at a time,
/// which is also what the GPU enforces.
#[cfg(feature = "whisper")]
pub struct WhisperRecognizer {
    context: Mutex<WhisperContext>,
    model_name: String,
}

#[cfg(feature = "whisper")]
impl std::fmt::Debug for WhisperRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperRecognizer")
            .field("model_name", &self.model_name)
            .field("context", &"<WhisperContext>")
            .finish()
    }
}

/// Whisper recognizer placeholder (without whisper feature).
#[cfg(not(feature = "whisper"))]
#[derive(Debug)]
pub struct WhisperRecognizer {
    model_name: String,
}

fn model_name_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}

fn unavailable(message: impl Into<String>) -> VoxError {
    VoxError::ModelUnavailable {
        kind: ModelKind::Recognition,
        message: message.into(),
    }
}

/// Load audio for inference: decode the WAV, collapse to mono, resample to
/// the 16 kHz Whisper expects.
fn load_inference_audio(audio_path: &Path) -> Result<Vec<f32>> {
    let segment = wav::read_wav_file(audio_path)?;
    Ok(reassemble(&[segment], defaults::WHISPER_SAMPLE_RATE).samples)
}

#[cfg(feature = "whisper")]
impl WhisperRecognizer {
    /// Load a GGML model from `model_path`.
    pub fn new(model_path: PathBuf) -> Result<Self> {
        LOGGING_HOOKS_INSTALLED.call_once(|| {
            whisper_rs::install_whisper_log_trampoline();
        });

        if !model_path.exists() {
            return Err(unavailable(format!(
                "model file not found: {}",
                model_path.display()
            )));
        }

        let path_str = model_path
            .to_str()
            .ok_or_else(|| unavailable("model path is not valid UTF-8"))?;

        let context =
            WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
                .map_err(|e| unavailable(format!("failed to load Whisper model: {}", e)))?;

        Ok(Self {
            context: Mutex::new(context),
            model_name: model_name_from_path(&model_path),
        })
    }
}

#[cfg(feature = "whisper")]
impl Recognizer for WhisperRecognizer {
    fn recognize(
        &self,
        audio_path: &Path,
        options: &RecognitionOptions,
    ) -> Result<RecognitionOutput> {
        let samples = load_inference_audio(audio_path)?;
        let duration = samples.len() as f64 / defaults::WHISPER_SAMPLE_RATE as f64;

        let context = self
            .context
            .lock()
            .map_err(|e| VoxError::generation("transcription", format!("context lock: {}", e)))?;

        let mut state = context
            .create_state()
            .map_err(|e| VoxError::generation("transcription", e.to_string()))?;

        let mut params = FullParams::new(SamplingStrategy::BeamSearch {
            beam_size: options.beam_size as i32,
            patience: -1.0,
        });
        params.set_language(options.language.as_deref());
        params.set_token_timestamps(options.word_timestamps);
        params.set_suppress_non_speech_tokens(options.vad_filter);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state
            .full(params, &samples)
            .map_err(|e| VoxError::generation("transcription", e.to_string()))?;

        let language = if let Some(hint) = &options.language {
            hint.clone()
        } else {
            let lang_id = state
                .full_lang_id_from_state()
                .map_err(|e| VoxError::generation("transcription", e.to_string()))?;
            whisper_rs::get_lang_str(lang_id).unwrap_or("en").to_string()
        };

        let n_segments = state
            .full_n_segments()
            .map_err(|e| VoxError::generation("transcription", e.to_string()))?;

        let mut segments = Vec::with_capacity(n_segments as usize);
        for i in 0..n_segments {
            let text = state
                .full_get_segment_text(i)
                .map_err(|e| VoxError::generation("transcription", format!("segment {}: {}", i, e)))?;
            // Timestamps arrive in centiseconds.
            let start = state.full_get_segment_t0(i).unwrap_or(0).max(0) as f64 / 100.0;
            let end = state.full_get_segment_t1(i).unwrap_or(0).max(0) as f64 / 100.0;

            let words = if options.word_timestamps {
                Some(collect_words(&state, i)?)
            } else {
                None
            };

            segments.push(RawSegment {
                text,
                start,
                end,
                words,
            });
        }

        Ok(RecognitionOutput {
            segments: Box::new(segments.into_iter().map(Ok)),
            info: RecognitionInfo {
                language,
                language_probability: 1.0,
                duration: Some(duration),
            },
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        true
    }
}

/// Group a segment's tokens into words at leading-space boundaries.
///
/// A word's probability is the mean of its token probabilities; its span
/// covers the first token's t0 through the last token's t1.
#[cfg(feature = "whisper")]
fn collect_words(state: &whisper_rs::WhisperState, segment: i32) -> Result<Vec<RawWord>> {
    let n_tokens = state
        .full_n_tokens(segment)
        .map_err(|e| VoxError::generation("transcription", e.to_string()))?;

    let mut words: Vec<RawWord> = Vec::new();
    let mut text = String::new();
    let mut start = 0.0_f64;
    let mut end = 0.0_f64;
    let mut prob_sum = 0.0_f64;
    let mut token_count = 0u32;

    let mut flush = |text: &mut String, start: f64, end: f64, prob_sum: f64, count: u32| {
        let trimmed = text.trim();
        if !trimmed.is_empty() && count > 0 {
            words.push(RawWord {
                word: trimmed.to_string(),
                start,
                end,
                probability: prob_sum / count as f64,
            });
        }
        text.clear();
    };

    for t in 0..n_tokens {
        let token_text = state
            .full_get_token_text(segment, t)
            .map_err(|e| VoxError::generation("transcription", e.to_string()))?;
        // Special markers like [_BEG_] carry no speech.
        if token_text.starts_with("[_") {
            continue;
        }
        let data = state
            .full_get_token_data(segment, t)
            .map_err(|e| VoxError::generation("transcription", e.to_string()))?;

        if token_text.starts_with(' ') && !text.is_empty() {
            flush(&mut text, start, end, prob_sum, token_count);
            prob_sum = 0.0;
            token_count = 0;
        }
        if text.is_empty() {
            start = data.t0.max(0) as f64 / 100.0;
        }
        end = data.t1.max(0) as f64 / 100.0;
        prob_sum += data.p as f64;
        token_count += 1;
        text.push_str(&token_text);
    }
    flush(&mut text, start, end, prob_sum, token_count);

    Ok(words)
}

#[cfg(not(feature = "whisper"))]
impl WhisperRecognizer {
    /// Create a recognizer stub. Succeeds if the model file exists so the
    /// lifecycle state machine still exercises; every call then fails.
    pub fn new(model_path: PathBuf) -> Result<Self> {
        if !model_path.exists() {
            return Err(unavailable(format!(
                "model file not found: {}",
                model_path.display()
            )));
        }
        Ok(Self {
            model_name: model_name_from_path(&model_path),
        })
    }
}

#[cfg(not(feature = "whisper"))]
impl Recognizer for WhisperRecognizer {
    fn recognize(
        &self,
        _audio_path: &Path,
        _options: &RecognitionOptions,
    ) -> Result<RecognitionOutput> {
        Err(VoxError::generation(
            "transcription",
            "whisper feature not enabled; rebuild with --features whisper (requires cmake)",
        ))
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        false
    }
}
