//! WAV file loading and saving with hound

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use thiserror::Error;

use crate::buffer::AudioBuffer;

#[derive(Error, Debug)]
pub enum FileReadError {
    #[error("failed to open WAV file '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: hound::Error,
    },

    #[error("failed to decode WAV samples: {source}")]
    Decode {
        #[source]
        source: hound::Error,
    },

    #[error("expected a mono WAV file, found {channels} channels")]
    NotMono { channels: u16 },

    #[error("unsupported WAV sample format: {bits}-bit {format:?}")]
    Unsupported { format: SampleFormat, bits: u16 },

    #[error("WAV file holds no samples")]
    Empty,

    #[error("WAV file declares a zero sample rate")]
    ZeroRate,

    #[error("failed to create WAV file '{path}': {source}")]
    Create {
        path: String,
        #[source]
        source: hound::Error,
    },

    #[error("failed to write WAV samples: {source}")]
    Write {
        #[source]
        source: hound::Error,
    },
}

/// Read a mono WAV file into an [`AudioBuffer`]
///
/// Integer PCM of 8 to 32 bits and 32-bit float are accepted; samples are
/// normalized to [-1.0, 1.0].
pub fn load_wav(path: &Path) -> Result<AudioBuffer, FileReadError> {
    let mut reader = WavReader::open(path).map_err(|source| FileReadError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let spec = reader.spec();

    if spec.channels != 1 {
        return Err(FileReadError::NotMono {
            channels: spec.channels,
        });
    }
    if spec.sample_rate == 0 {
        return Err(FileReadError::ZeroRate);
    }

    let samples: Result<Vec<f64>, hound::Error> = match (spec.sample_format, spec.bits_per_sample)
    {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect(),
        (SampleFormat::Int, bits @ 1..=32) => {
            let scale = (1u64 << (bits - 1)) as f64;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f64 / scale))
                .collect()
        }
        (format, bits) => return Err(FileReadError::Unsupported { format, bits }),
    };
    let samples = samples.map_err(|source| FileReadError::Decode { source })?;

    if samples.is_empty() {
        return Err(FileReadError::Empty);
    }

    Ok(AudioBuffer::new(samples, spec.sample_rate))
}

/// Write a buffer as a mono 16-bit PCM WAV file
///
/// Samples are clamped to [-1.0, 1.0] before scaling to i16.
pub fn save_wav(buffer: &AudioBuffer, path: &Path) -> Result<(), FileReadError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(|source| FileReadError::Create {
        path: path.display().to_string(),
        source,
    })?;

    for &sample in buffer.samples() {
        let scaled = (sample.clamp(-1.0, 1.0) * i16::MAX as f64) as i16;
        writer
            .write_sample(scaled)
            .map_err(|source| FileReadError::Write { source })?;
    }

    writer
        .finalize()
        .map_err(|source| FileReadError::Write { source })
}
