//! Engine boundaries: synthesis and recognition.
//!
//! Both engines sit behind traits so the pipeline and the HTTP layer can be
//! exercised against mocks. The real implementations live in
//! [`chatterbox`] (subprocess adapter) and [`whisper`] (whisper-rs).

pub mod chatterbox;
pub mod recognizer;
pub mod synthesizer;
pub mod whisper;

pub use chatterbox::ProcessSynthesizer;
pub use recognizer::{
    MockRecognizer, RawSegment, RawWord, RecognitionInfo, RecognitionOptions, RecognitionOutput,
    Recognizer,
};
pub use synthesizer::{MockSynthesizer, SynthesisOptions, Synthesizer};
pub use whisper::WhisperRecognizer;
