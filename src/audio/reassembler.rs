//! Waveform reassembly.
//!
//! Turns the staged per-batch waveforms back into one continuous take:
//! downmix each segment to mono, resample it to the target rate, then
//! concatenate in batch order. Resampling happens per segment before
//! concatenation so a rate change never lands mid-stream.

use crate::audio::{AudioSegment, FinalAudio};

/// Reassemble ordered segments into a single mono waveform at `target_rate`.
///
/// Pure function of its inputs. Empty input yields an empty waveform at the
/// target rate; segments with zero frames contribute nothing.
pub fn reassemble(segments: &[AudioSegment], target_rate: u32) -> FinalAudio {
    let mut samples = Vec::new();

    for segment in segments {
        let mono = downmix(segment);
        if segment.sample_rate == target_rate {
            samples.extend_from_slice(&mono);
        } else {
            samples.extend_from_slice(&resample(&mono, segment.sample_rate, target_rate));
        }
    }

    FinalAudio {
        samples,
        sample_rate: target_rate,
    }
}

/// Average interleaved channels into a mono buffer.
fn downmix(segment: &AudioSegment) -> Vec<f32> {
    if segment.channels <= 1 {
        return segment.samples.clone();
    }

    let channels = segment.channels as usize;
    segment
        .samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Linear-interpolation resample of a mono buffer.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() || from_rate == 0 {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).round() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let position = i as f64 * ratio;
        let index = position as usize;
        let frac = (position - index as f64) as f32;

        let current = samples[index.min(samples.len() - 1)];
        let next = samples[(index + 1).min(samples.len() - 1)];
        output.push(current + (next - current) * frac);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concatenation_preserves_order_and_content() {
        let first = AudioSegment::mono(vec![0.1, 0.2], 24_000);
        let second = AudioSegment::mono(vec![0.3, 0.4, 0.5], 24_000);

        let audio = reassemble(&[first, second], 24_000);
        assert_eq!(audio.samples, vec![0.1, 0.2, 0.3, 0.4, 0.5]);
        assert_eq!(audio.sample_rate, 24_000);
    }

    #[test]
    fn test_stereo_downmixed_by_averaging() {
        let stereo = AudioSegment {
            samples: vec![1.0, 0.0, 0.0, 1.0, 0.5, 0.5],
            sample_rate: 24_000,
            channels: 2,
        };

        let audio = reassemble(&[stereo], 24_000);
        assert_eq!(audio.samples, vec![0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_upsample_doubles_length() {
        let segment = AudioSegment::mono(vec![0.0, 1.0, 0.0, -1.0], 12_000);
        let audio = reassemble(&[segment], 24_000);

        assert_eq!(audio.samples.len(), 8);
        // Midpoints fall between the source samples.
        assert!((audio.samples[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_downsample_halves_length() {
        let segment = AudioSegment::mono(vec![0.0; 100], 48_000);
        let audio = reassemble(&[segment], 24_000);
        assert_eq!(audio.samples.len(), 50);
    }

    #[test]
    fn test_total_duration_is_sum_of_segment_durations() {
        // Mixed rates: one second at each of three rates.
        let segments = vec![
            AudioSegment::mono(vec![0.1; 16_000], 16_000),
            AudioSegment::mono(vec![0.2; 24_000], 24_000),
            AudioSegment {
                samples: vec![0.3; 96_000],
                sample_rate: 48_000,
                channels: 2,
            },
        ];

        let audio = reassemble(&segments, 24_000);
        let tolerance = 1.0 / 24_000.0;
        assert!((audio.duration_seconds() - 3.0).abs() <= tolerance);
    }

    #[test]
    fn test_resample_happens_per_segment_before_concat() {
        // A 16 kHz segment followed by a 24 kHz one: the first must be
        // stretched to 24 kHz before the second is appended.
        let segments = vec![
            AudioSegment::mono(vec![0.5; 16], 16_000),
            AudioSegment::mono(vec![-0.5; 24], 24_000),
        ];

        let audio = reassemble(&segments, 24_000);
        assert_eq!(audio.samples.len(), 48);
        assert!(audio.samples[..24].iter().all(|&s| s > 0.0));
        assert!(audio.samples[24..].iter().all(|&s| s < 0.0));
    }

    #[test]
    fn test_empty_input_yields_empty_waveform() {
        let audio = reassemble(&[], 24_000);
        assert!(audio.samples.is_empty());
        assert_eq!(audio.sample_rate, 24_000);
    }

    #[test]
    fn test_zero_frame_segment_contributes_nothing() {
        let segments = vec![
            AudioSegment::mono(vec![], 16_000),
            AudioSegment::mono(vec![0.1, 0.2], 24_000),
        ];
        let audio = reassemble(&segments, 24_000);
        assert_eq!(audio.samples, vec![0.1, 0.2]);
    }
}
