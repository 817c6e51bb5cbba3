//! Default configuration constants for voxserve.
//!
//! Shared across config, request parsing, and the planning pipeline so the
//! same numbers are never duplicated.

/// Maximum estimated speech tokens a single synthesis batch may accumulate.
///
/// The synthesis engine degrades (truncated or garbled audio) past roughly
/// this many speech tokens per call, so the planner closes batches before
/// crossing it.
pub const MAX_SPEECH_TOKENS: u32 = 900;

/// Empirical speech-token expansion per text word.
///
/// Chatterbox emits roughly 6-8 acoustic tokens per text token; 7 is the
/// observed average used for planning.
pub const SPEECH_TOKENS_PER_WORD: u32 = 7;

/// Maximum accepted text length for a synthesis request, in characters.
pub const MAX_TEXT_CHARS: usize = 10_000;

/// Default expressiveness for synthesis (0.0 to 1.0).
pub const DEFAULT_EXAGGERATION: f32 = 0.5;

/// Default classifier-free-guidance weight for synthesis (0.0 to 1.0).
///
/// Any value above zero doubles the engine's forward passes, which the
/// token budget estimator accounts for.
pub const DEFAULT_CFG_WEIGHT: f32 = 0.5;

/// Default sampling temperature for synthesis.
pub const DEFAULT_TEMPERATURE: f32 = 0.9;

/// Default synthesis language code.
pub const DEFAULT_TTS_LANGUAGE: &str = "en";

/// Default beam width for recognition decoding.
pub const DEFAULT_BEAM_SIZE: usize = 5;

/// Largest accepted beam width. Decoding cost grows linearly with the
/// beam, and whisper.cpp takes the width as an i32.
pub const MAX_BEAM_SIZE: usize = 100;

/// Default Whisper model name.
///
/// "large-v3" matches the production deployment; smaller names ("base",
/// "tiny") are valid for constrained hosts.
pub const DEFAULT_WHISPER_MODEL: &str = "large-v3";

/// Sample rate Whisper expects for input audio, in Hz.
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Native output sample rate of the Chatterbox synthesis engine, in Hz.
/// Also the target rate for reassembled output.
pub const SYNTHESIS_SAMPLE_RATE: u32 = 24_000;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8000;
