//! Audio buffers, WAV I/O, and waveform reassembly.

pub mod reassembler;
pub mod wav;

pub use reassembler::reassemble;

/// One synthesized waveform as produced by a single engine call.
///
/// Samples are interleaved f32 in [-1.0, 1.0]. Lives only as long as
/// reassembly needs it.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioSegment {
    /// Mono segment constructor, the common case for engine output.
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            channels: 1,
        }
    }

    /// Number of sample frames (samples per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// Duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }
}

/// The final reassembled output: one mono waveform at the target rate.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl FinalAudio {
    /// Duration in seconds: total sample count over the target rate.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}
