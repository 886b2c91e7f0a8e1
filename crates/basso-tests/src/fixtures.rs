//! Signal fixtures and in-process stand-ins for the vocoder and ffmpeg.

use std::cell::RefCell;
use std::f64::consts::PI;
use std::path::Path;

use basso_backend_audio::{
    read_wav_mono, write_wav_f32, AudioError, AudioResult, PitchAnalyzer, SpectralEnvelope,
    WorldFeatures, DEFAULT_FRAME_PERIOD_MS,
};
use basso_backend_ffmpeg::{EncodeOptions, TranscodeError, TranscodeResult, Transcoder};

/// RMS below which a frame counts as silent.
const SILENCE_RMS: f64 = 1e-3;

/// A sine tone starting at phase zero.
pub fn sine_wave(freq_hz: f64, amplitude: f64, secs: f64, sample_rate: u32) -> Vec<f64> {
    let len = (secs * sample_rate as f64).round() as usize;
    (0..len)
        .map(|n| amplitude * (2.0 * PI * freq_hz * n as f64 / sample_rate as f64).sin())
        .collect()
}

/// Positive-going zero crossings per second.
pub fn zero_crossing_rate(samples: &[f64], sample_rate: u32) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let crossings = samples
        .windows(2)
        .filter(|w| w[0] < 0.0 && w[1] >= 0.0)
        .count();
    crossings as f64 * sample_rate as f64 / samples.len() as f64
}

/// Envelope with one Gaussian bump per frame.
pub fn gaussian_envelope(frames: usize, bins: usize, center: f64, width: f64) -> SpectralEnvelope {
    let row: Vec<f64> = (0..bins)
        .map(|b| (-((b as f64 - center) / width).powi(2)).exp())
        .collect();
    SpectralEnvelope::from_frames(vec![row; frames]).expect("non-empty envelope")
}

/// Index of the largest value in a frame.
pub fn peak_bin(frame: &[f64]) -> usize {
    frame
        .iter()
        .enumerate()
        .fold((0, f64::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
        .0
}

/// Deterministic analyzer for tests.
///
/// Estimates a single F0 for the whole input from its zero-crossing rate,
/// marks frames above a small RMS threshold as voiced and gives each frame a
/// Gaussian envelope scaled by its RMS. Synthesis renders a sine per frame at
/// the frame's F0 with the envelope peak as amplitude.
#[derive(Debug, Clone)]
pub struct SyntheticAnalyzer {
    pub bins: usize,
    pub formant_center: f64,
    pub frame_period_ms: f64,
}

impl Default for SyntheticAnalyzer {
    fn default() -> Self {
        Self {
            bins: 65,
            formant_center: 20.0,
            frame_period_ms: DEFAULT_FRAME_PERIOD_MS,
        }
    }
}

impl SyntheticAnalyzer {
    fn hop(&self, sample_rate: u32, period_ms: f64) -> usize {
        ((sample_rate as f64 * period_ms / 1000.0).round() as usize).max(1)
    }
}

impl PitchAnalyzer for SyntheticAnalyzer {
    fn analyze(&self, samples: &[f64], sample_rate: u32) -> AudioResult<WorldFeatures> {
        if samples.is_empty() {
            return Err(AudioError::analysis("no samples to analyze"));
        }
        let hop = self.hop(sample_rate, self.frame_period_ms);
        let f0_estimate = zero_crossing_rate(samples, sample_rate);

        let mut f0 = Vec::new();
        let mut sp_rows = Vec::new();
        let mut ap_rows = Vec::new();
        for chunk in samples.chunks(hop) {
            let rms = (chunk.iter().map(|s| s * s).sum::<f64>() / chunk.len() as f64).sqrt();
            f0.push(if rms > SILENCE_RMS { f0_estimate } else { 0.0 });
            sp_rows.push(
                (0..self.bins)
                    .map(|b| rms * (-((b as f64 - self.formant_center) / 4.0).powi(2)).exp())
                    .collect::<Vec<_>>(),
            );
            ap_rows.push(vec![0.5; self.bins]);
        }

        WorldFeatures::new(
            f0,
            SpectralEnvelope::from_frames(sp_rows)?,
            SpectralEnvelope::from_frames(ap_rows)?,
            self.frame_period_ms,
        )
    }

    fn synthesize(&self, features: &WorldFeatures, sample_rate: u32) -> AudioResult<Vec<f64>> {
        let hop = self.hop(sample_rate, features.frame_period_ms);
        let mut out = Vec::with_capacity(features.frames() * hop);
        let mut phase = 0.0;
        for (frame, &f0) in features.f0.iter().enumerate() {
            let amplitude = features
                .spectral_envelope
                .frame(frame)
                .iter()
                .cloned()
                .fold(0.0, f64::max);
            for _ in 0..hop {
                if f0 > 0.0 {
                    phase += 2.0 * PI * f0 / sample_rate as f64;
                    out.push(amplitude * phase.sin());
                } else {
                    out.push(0.0);
                }
            }
        }
        Ok(out)
    }
}

/// Transcoder that only understands WAV and records encode requests.
///
/// Decoding rewrites the input as mono float WAV and requires it to already
/// be at the requested rate. Encoding copies the processed WAV.
#[derive(Debug, Default)]
pub struct WavTranscoder {
    decoded: RefCell<Vec<u32>>,
    encoded: RefCell<Vec<EncodeOptions>>,
}

impl WavTranscoder {
    /// Sample rates requested by each decode call.
    pub fn decoded(&self) -> Vec<u32> {
        self.decoded.borrow().clone()
    }

    /// Options passed to each encode call.
    pub fn encoded(&self) -> Vec<EncodeOptions> {
        self.encoded.borrow().clone()
    }
}

impl Transcoder for WavTranscoder {
    fn decode(&self, input: &Path, output_wav: &Path, sample_rate: u32) -> TranscodeResult<()> {
        self.decoded.borrow_mut().push(sample_rate);
        if !input.exists() {
            return Err(TranscodeError::InputNotFound {
                path: input.to_path_buf(),
            });
        }
        let audio = read_wav_mono(input)
            .map_err(|e| TranscodeError::process_failed(1, e.to_string()))?;
        if audio.sample_rate != sample_rate {
            return Err(TranscodeError::invalid_option(
                "sample_rate",
                format!("input is {} Hz, resampling is not supported", audio.sample_rate),
            ));
        }
        write_wav_f32(output_wav, &audio.samples, sample_rate)
            .map_err(|e| TranscodeError::process_failed(1, e.to_string()))
    }

    fn encode(&self, input_wav: &Path, output: &Path, options: &EncodeOptions) -> TranscodeResult<()> {
        options.validate()?;
        self.encoded.borrow_mut().push(options.clone());
        std::fs::copy(input_wav, output)?;
        Ok(())
    }
}
