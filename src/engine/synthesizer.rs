use crate::audio::AudioSegment;
use crate::defaults;
use crate::error::{Result, VoxError};
use std::path::PathBuf;
use std::sync::Arc;

/// Parameters for one synthesis call.
#[derive(Debug, Clone)]
pub struct SynthesisOptions {
    /// Reference audio for voice cloning; the engine mimics this speaker.
    pub voice_reference: Option<PathBuf>,
    /// Emotion exaggeration, 0.0 to 1.0.
    pub exaggeration: f32,
    /// Classifier-free guidance weight, 0.0 to 1.0. Above zero doubles
    /// synthesis cost; the batch planner accounts for that.
    pub cfg_weight: f32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            voice_reference: None,
            exaggeration: defaults::DEFAULT_EXAGGERATION,
            cfg_weight: defaults::DEFAULT_CFG_WEIGHT,
            temperature: defaults::DEFAULT_TEMPERATURE,
        }
    }
}

/// Trait for text-to-speech synthesis.
///
/// One call produces one waveform for one batch of text. Implementations
/// need not tolerate overlapping calls; handles from the model lifecycle
/// serialize them per instance.
pub trait Synthesizer: Send + Sync {
    /// Synthesize `text` into a waveform.
    fn synthesize(&self, text: &str, options: &SynthesisOptions) -> Result<AudioSegment>;

    /// Native output sample rate of the engine.
    fn sample_rate(&self) -> u32;

    /// Check if the synthesizer is ready.
    fn is_ready(&self) -> bool;
}

impl std::fmt::Debug for dyn Synthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synthesizer")
            .field("sample_rate", &self.sample_rate())
            .field("is_ready", &self.is_ready())
            .finish()
    }
}

/// Implement Synthesizer for Arc<T> so one loaded engine can be shared
/// across requests.
impl<T: Synthesizer> Synthesizer for Arc<T> {
    fn synthesize(&self, text: &str, options: &SynthesisOptions) -> Result<AudioSegment> {
        (**self).synthesize(text, options)
    }

    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Mock synthesizer for testing.
///
/// Emits a deterministic waveform: a fixed number of samples per word, so
/// tests can predict output duration from input text.
#[derive(Debug, Clone)]
pub struct MockSynthesizer {
    sample_rate: u32,
    samples_per_word: usize,
    should_fail: bool,
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self {
            sample_rate: 24_000,
            samples_per_word: 1_000,
            should_fail: false,
        }
    }

    /// Configure the native sample rate of the mock output.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Configure how many samples each input word contributes.
    pub fn with_samples_per_word(mut self, samples: usize) -> Self {
        self.samples_per_word = samples;
        self
    }

    /// Configure the mock to fail on synthesize.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Synthesizer for MockSynthesizer {
    fn synthesize(&self, text: &str, _options: &SynthesisOptions) -> Result<AudioSegment> {
        if self.should_fail {
            return Err(VoxError::generation("synthesis", "mock synthesis failure"));
        }
        let words = text.split_whitespace().count();
        Ok(AudioSegment::mono(
            vec![0.1; words * self.samples_per_word],
            self.sample_rate,
        ))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_match_service_defaults() {
        let options = SynthesisOptions::default();
        assert!(options.voice_reference.is_none());
        assert_eq!(options.exaggeration, 0.5);
        assert_eq!(options.cfg_weight, 0.5);
        assert_eq!(options.temperature, 0.9);
    }

    #[test]
    fn test_mock_output_scales_with_word_count() {
        let synth = MockSynthesizer::new().with_samples_per_word(100);
        let options = SynthesisOptions::default();

        let two = synth.synthesize("hello world", &options).unwrap();
        let four = synth.synthesize("one two three four", &options).unwrap();

        assert_eq!(two.samples.len(), 200);
        assert_eq!(four.samples.len(), 400);
        assert_eq!(two.channels, 1);
    }

    #[test]
    fn test_mock_failure_surfaces_as_generation_error() {
        let synth = MockSynthesizer::new().with_failure();
        let err = synth
            .synthesize("anything", &SynthesisOptions::default())
            .unwrap_err();

        assert!(matches!(
            err,
            VoxError::Generation {
                stage: "synthesis",
                ..
            }
        ));
        assert!(!synth.is_ready());
    }

    #[test]
    fn test_synthesizer_trait_is_object_safe() {
        let synth: Box<dyn Synthesizer> =
            Box::new(MockSynthesizer::new().with_sample_rate(16_000));
        assert_eq!(synth.sample_rate(), 16_000);
        assert!(synth.is_ready());
    }

    #[test]
    fn test_arc_synthesizer_shares_engine() {
        let synth = Arc::new(MockSynthesizer::new());
        let shared = Arc::clone(&synth);

        let segment = shared
            .synthesize("shared call", &SynthesisOptions::default())
            .unwrap();
        assert!(!segment.samples.is_empty());
    }
}
