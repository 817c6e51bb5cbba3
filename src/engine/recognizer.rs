use crate::defaults;
use crate::error::{Result, VoxError};
use std::path::Path;
use std::sync::Arc;

/// Parameters for one recognition call.
#[derive(Debug, Clone)]
pub struct RecognitionOptions {
    /// Language hint; None lets the engine detect.
    pub language: Option<String>,
    /// Beam width for decoding.
    pub beam_size: usize,
    /// Whether to produce per-word timestamps.
    pub word_timestamps: bool,
    /// Whether to suppress non-speech audio during decoding.
    pub vad_filter: bool,
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self {
            language: None,
            beam_size: defaults::DEFAULT_BEAM_SIZE,
            word_timestamps: true,
            vad_filter: true,
        }
    }
}

/// One word as emitted by the recognition engine, times in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct RawWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
    pub probability: f64,
}

/// One segment as emitted by the recognition engine, times in seconds.
///
/// `words` is present only when word timestamps were requested and the
/// engine produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSegment {
    pub text: String,
    pub start: f64,
    pub end: f64,
    pub words: Option<Vec<RawWord>>,
}

/// Global metadata for one recognition call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionInfo {
    pub language: String,
    pub language_probability: f64,
    /// Total audio duration in seconds; engines may not report it.
    pub duration: Option<f64>,
}

/// The result of one engine invocation: a single-pass segment stream plus
/// global metadata.
///
/// The stream is finite and cannot be re-iterated; the collector drains it
/// exactly once.
pub struct RecognitionOutput {
    pub segments: Box<dyn Iterator<Item = Result<RawSegment>> + Send>,
    pub info: RecognitionInfo,
}

impl std::fmt::Debug for RecognitionOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognitionOutput")
            .field("segments", &"<iterator>")
            .field("info", &self.info)
            .finish()
    }
}

/// Trait for speech recognition.
///
/// This trait allows swapping implementations (real Whisper vs mock).
pub trait Recognizer: Send + Sync {
    /// Recognize speech in the WAV file at `audio_path`.
    fn recognize(&self, audio_path: &Path, options: &RecognitionOptions)
        -> Result<RecognitionOutput>;

    /// Get the name of the loaded model.
    fn model_name(&self) -> &str;

    /// Check if the recognizer is ready.
    fn is_ready(&self) -> bool;
}

/// Implement Recognizer for Arc<T> so one loaded engine can be shared
/// across requests.
impl<T: Recognizer> Recognizer for Arc<T> {
    fn recognize(
        &self,
        audio_path: &Path,
        options: &RecognitionOptions,
    ) -> Result<RecognitionOutput> {
        (**self).recognize(audio_path, options)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Mock recognizer for testing.
#[derive(Debug, Clone)]
pub struct MockRecognizer {
    model_name: String,
    segments: Vec<RawSegment>,
    info: RecognitionInfo,
    should_fail: bool,
}

impl MockRecognizer {
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            segments: Vec::new(),
            info: RecognitionInfo {
                language: "en".to_string(),
                language_probability: 1.0,
                duration: None,
            },
            should_fail: false,
        }
    }

    /// Configure the segments each call emits.
    pub fn with_segments(mut self, segments: Vec<RawSegment>) -> Self {
        self.segments = segments;
        self
    }

    /// Configure the global metadata each call reports.
    pub fn with_info(mut self, info: RecognitionInfo) -> Self {
        self.info = info;
        self
    }

    /// Configure the mock to fail on recognize.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Recognizer for MockRecognizer {
    fn recognize(
        &self,
        _audio_path: &Path,
        _options: &RecognitionOptions,
    ) -> Result<RecognitionOutput> {
        if self.should_fail {
            return Err(VoxError::generation(
                "transcription",
                "mock recognition failure",
            ));
        }
        let segments = self.segments.clone();
        Ok(RecognitionOutput {
            segments: Box::new(segments.into_iter().map(Ok)),
            info: self.info.clone(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}
