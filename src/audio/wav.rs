//! WAV reading and writing via hound.
//!
//! Engine output, uploaded reference audio, and staged batch files all move
//! through WAV. Reads accept 16-bit PCM and 32-bit float at any rate and
//! channel count; writes produce 16-bit PCM, which every consumer here
//! accepts.

use crate::audio::{AudioSegment, FinalAudio};
use crate::error::{Result, VoxError};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

/// Read a WAV file into an [`AudioSegment`], preserving its rate and
/// channel count.
pub fn read_wav_file(path: &Path) -> Result<AudioSegment> {
    let reader = hound::WavReader::open(path).map_err(|e| {
        VoxError::generation("audio decode", format!("{}: {}", path.display(), e))
    })?;
    read_segment(reader)
}

/// Read WAV data from an in-memory buffer (uploads, fetched URLs).
pub fn read_wav_bytes(data: &[u8]) -> Result<AudioSegment> {
    let reader = hound::WavReader::new(Cursor::new(data))
        .map_err(|e| VoxError::generation("audio decode", e.to_string()))?;
    read_segment(reader)
}

fn read_segment<R: Read + Seek>(mut reader: hound::WavReader<R>) -> Result<AudioSegment> {
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            if spec.bits_per_sample != 16 {
                return Err(VoxError::generation(
                    "audio decode",
                    format!("unsupported bit depth: {}", spec.bits_per_sample),
                ));
            }
            reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / 32768.0))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| VoxError::generation("audio decode", e.to_string()))?
        }
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| VoxError::generation("audio decode", e.to_string()))?,
    };

    Ok(AudioSegment {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Write an [`AudioSegment`] to a WAV file as 16-bit PCM.
pub fn write_wav_file(path: &Path, segment: &AudioSegment) -> Result<()> {
    let spec = hound::WavSpec {
        channels: segment.channels,
        sample_rate: segment.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(|e| {
        VoxError::generation("audio encode", format!("{}: {}", path.display(), e))
    })?;
    write_samples(&mut writer, &segment.samples)?;
    writer
        .finalize()
        .map_err(|e| VoxError::generation("audio encode", e.to_string()))
}

/// Encode a [`FinalAudio`] as WAV bytes for the HTTP response body.
pub fn encode_wav_bytes(audio: &FinalAudio) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| VoxError::generation("audio encode", e.to_string()))?;
        write_samples(&mut writer, &audio.samples)?;
        writer
            .finalize()
            .map_err(|e| VoxError::generation("audio encode", e.to_string()))?;
    }
    Ok(cursor.into_inner())
}

fn write_samples<W: std::io::Write + Seek>(
    writer: &mut hound::WavWriter<W>,
    samples: &[f32],
) -> Result<()> {
    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
        writer
            .write_sample(value)
            .map_err(|e| VoxError::generation("audio encode", e.to_string()))?;
    }
    Ok(())
}
