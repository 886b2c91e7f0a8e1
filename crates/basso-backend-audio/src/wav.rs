//! WAV reading and writing.
//!
//! Input WAVs may be integer or float and any channel count; they are
//! folded to mono `f64`. Output is always mono 32-bit float.

use std::io::{Read, Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{AudioError, AudioResult};

/// Mono audio decoded from a WAV file.
#[derive(Debug, Clone, PartialEq)]
pub struct MonoAudio {
    /// Samples in `[-1, 1]`.
    pub samples: Vec<f64>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl MonoAudio {
    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Reads a WAV file and folds it to mono.
pub fn read_wav_mono(path: &Path) -> AudioResult<MonoAudio> {
    let reader = WavReader::open(path)?;
    decode_mono(reader)
}

/// Reads WAV data from any reader and folds it to mono.
pub fn read_wav_mono_from<R: Read>(reader: R) -> AudioResult<MonoAudio> {
    decode_mono(WavReader::new(reader)?)
}

fn decode_mono<R: Read>(reader: WavReader<R>) -> AudioResult<MonoAudio> {
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(AudioError::InvalidSampleRate { rate: 0 });
    }
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f64> = match spec.sample_format {
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f64;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f64 / scale))
                .collect::<Result<_, _>>()?
        }
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<Result<_, _>>()?,
    };

    let samples = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f64>() / frame.len() as f64)
        .collect();

    Ok(MonoAudio {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Writes mono samples as a 32-bit float WAV file.
pub fn write_wav_f32(path: &Path, samples: &[f64], sample_rate: u32) -> AudioResult<()> {
    let writer = WavWriter::create(path, float_spec(sample_rate)?)?;
    encode_f32(writer, samples)
}

/// Writes mono samples as 32-bit float WAV to any seekable writer.
pub fn write_wav_f32_to<W: Write + Seek>(
    writer: W,
    samples: &[f64],
    sample_rate: u32,
) -> AudioResult<()> {
    encode_f32(WavWriter::new(writer, float_spec(sample_rate)?)?, samples)
}

fn float_spec(sample_rate: u32) -> AudioResult<WavSpec> {
    if sample_rate == 0 {
        return Err(AudioError::InvalidSampleRate { rate: 0 });
    }
    Ok(WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    })
}

fn encode_f32<W: Write + Seek>(mut writer: WavWriter<W>, samples: &[f64]) -> AudioResult<()> {
    for &sample in samples {
        writer.write_sample(sample as f32)?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn int16_wav(samples: &[i16], channels: u16, sample_rate: u32) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let spec = WavSpec {
                channels,
                sample_rate,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            };
            let mut writer = WavWriter::new(Cursor::new(&mut buffer), spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        buffer
    }

    #[test]
    fn test_float_roundtrip() {
        let samples = vec![0.0, 0.5, -0.25, 0.75];
        let mut buffer = Cursor::new(Vec::new());
        write_wav_f32_to(&mut buffer, &samples, 22050).unwrap();

        let audio = read_wav_mono_from(Cursor::new(buffer.into_inner())).unwrap();
        assert_eq!(audio.sample_rate, 22050);
        assert_eq!(audio.samples, samples);
    }

    #[test]
    fn test_int16_scaled() {
        let bytes = int16_wav(&[0, 16384, -32768], 1, 8000);
        let audio = read_wav_mono_from(Cursor::new(bytes)).unwrap();
        assert_eq!(audio.samples, vec![0.0, 0.5, -1.0]);
    }

    #[test]
    fn test_stereo_folded_to_mono() {
        let bytes = int16_wav(&[16384, 0, -16384, -16384], 2, 8000);
        let audio = read_wav_mono_from(Cursor::new(bytes)).unwrap();
        assert_eq!(audio.samples, vec![0.25, -0.5]);
        assert_eq!(audio.duration_secs(), 2.0 / 8000.0);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        write_wav_f32(&path, &[0.1, 0.2], 16000).unwrap();
        let audio = read_wav_mono(&path).unwrap();
        assert_eq!(audio.samples.len(), 2);
        assert_eq!(audio.sample_rate, 16000);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            read_wav_mono_from(Cursor::new(b"not a wav".to_vec())),
            Err(AudioError::Wav(_))
        ));
        let mut buffer = Cursor::new(Vec::new());
        assert!(write_wav_f32_to(&mut buffer, &[0.0], 0).is_err());
    }
}
