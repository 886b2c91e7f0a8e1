//! Source-filter analysis and resynthesis.
//!
//! F0 estimation, spectral envelope extraction, aperiodicity estimation and
//! waveform synthesis live behind [`PitchAnalyzer`]. The `world` feature
//! provides [`WorldAnalyzer`], backed by the WORLD vocoder.

use crate::envelope::SpectralEnvelope;
use crate::error::{AudioError, AudioResult};

/// Analysis hop used by the WORLD analyzer, in milliseconds.
pub const DEFAULT_FRAME_PERIOD_MS: f64 = 5.0;

/// Per-frame vocoder parameters of one utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldFeatures {
    /// Fundamental frequency per frame in Hz; 0 marks an unvoiced frame.
    pub f0: Vec<f64>,
    /// Smoothed magnitude spectrum per frame.
    pub spectral_envelope: SpectralEnvelope,
    /// Aperiodicity per frame, same shape as the spectral envelope.
    pub aperiodicity: SpectralEnvelope,
    /// Hop between frames in milliseconds.
    pub frame_period_ms: f64,
}

impl WorldFeatures {
    /// Bundles features, checking that every track has the same frame count.
    pub fn new(
        f0: Vec<f64>,
        spectral_envelope: SpectralEnvelope,
        aperiodicity: SpectralEnvelope,
        frame_period_ms: f64,
    ) -> AudioResult<Self> {
        if spectral_envelope.frames() != f0.len() {
            return Err(AudioError::inconsistent(format!(
                "{} F0 frames but {} envelope frames",
                f0.len(),
                spectral_envelope.frames()
            )));
        }
        if aperiodicity.shape() != spectral_envelope.shape() {
            return Err(AudioError::inconsistent(format!(
                "aperiodicity is {}x{}, envelope is {}x{}",
                aperiodicity.frames(),
                aperiodicity.bins(),
                spectral_envelope.frames(),
                spectral_envelope.bins()
            )));
        }
        if !(frame_period_ms.is_finite() && frame_period_ms > 0.0) {
            return Err(AudioError::inconsistent(format!(
                "frame period must be positive, got {frame_period_ms}"
            )));
        }
        Ok(Self {
            f0,
            spectral_envelope,
            aperiodicity,
            frame_period_ms,
        })
    }

    /// Number of analysis frames.
    pub fn frames(&self) -> usize {
        self.f0.len()
    }

    /// Fraction of frames with a non-zero F0.
    pub fn voiced_ratio(&self) -> f64 {
        if self.f0.is_empty() {
            return 0.0;
        }
        let voiced = self.f0.iter().filter(|&&f| f > 0.0).count();
        voiced as f64 / self.f0.len() as f64
    }
}

/// Analysis/synthesis capability of a vocoder.
pub trait PitchAnalyzer {
    /// Decomposes a mono waveform into vocoder features.
    fn analyze(&self, samples: &[f64], sample_rate: u32) -> AudioResult<WorldFeatures>;

    /// Renders vocoder features back into a mono waveform.
    fn synthesize(&self, features: &WorldFeatures, sample_rate: u32) -> AudioResult<Vec<f64>>;
}

#[cfg(feature = "world")]
pub use world::WorldAnalyzer;

#[cfg(feature = "world")]
mod world {
    use rsworld::{cheaptrick, d4c, dio, stonemask, synthesis};
    use rsworld_sys::{CheapTrickOption, D4COption, DioOption};

    use super::{PitchAnalyzer, WorldFeatures};
    use crate::envelope::SpectralEnvelope;
    use crate::error::{AudioError, AudioResult};

    /// WORLD vocoder: DIO + StoneMask for F0, CheapTrick for the envelope,
    /// D4C for aperiodicity.
    #[derive(Debug, Clone)]
    pub struct WorldAnalyzer {
        frame_period_ms: f64,
    }

    impl WorldAnalyzer {
        /// Creates an analyzer with the default 5 ms hop.
        pub fn new() -> Self {
            Self {
                frame_period_ms: super::DEFAULT_FRAME_PERIOD_MS,
            }
        }

        /// Sets the analysis hop in milliseconds.
        pub fn frame_period_ms(mut self, period: f64) -> Self {
            self.frame_period_ms = period;
            self
        }
    }

    impl Default for WorldAnalyzer {
        fn default() -> Self {
            Self::new()
        }
    }

    impl PitchAnalyzer for WorldAnalyzer {
        fn analyze(&self, samples: &[f64], sample_rate: u32) -> AudioResult<WorldFeatures> {
            if sample_rate == 0 {
                return Err(AudioError::InvalidSampleRate { rate: sample_rate });
            }
            if samples.is_empty() {
                return Err(AudioError::analysis("cannot analyze an empty waveform"));
            }
            let fs = sample_rate as i32;
            let x = samples.to_vec();

            let mut dio_option = DioOption::new();
            dio_option.frame_period = self.frame_period_ms;
            let (temporal_positions, raw_f0) = dio(&x, fs, &dio_option);
            let f0 = stonemask(&x, fs, &temporal_positions, &raw_f0);

            let mut cheaptrick_option = CheapTrickOption::new(fs);
            let sp = cheaptrick(&x, fs, &temporal_positions, &f0, &mut cheaptrick_option);
            let d4c_option = D4COption::new();
            let ap = d4c(&x, fs, &temporal_positions, &f0, &d4c_option);

            tracing::debug!(
                frames = f0.len(),
                bins = sp.first().map(Vec::len).unwrap_or(0),
                "WORLD analysis complete"
            );

            WorldFeatures::new(
                f0,
                SpectralEnvelope::from_frames(sp)?,
                SpectralEnvelope::from_frames(ap)?,
                self.frame_period_ms,
            )
        }

        fn synthesize(&self, features: &WorldFeatures, sample_rate: u32) -> AudioResult<Vec<f64>> {
            if sample_rate == 0 {
                return Err(AudioError::InvalidSampleRate { rate: sample_rate });
            }
            let sp = features.spectral_envelope.clone().into_frames();
            let ap = features.aperiodicity.clone().into_frames();
            Ok(synthesis(
                &features.f0,
                &sp,
                &ap,
                features.frame_period_ms,
                sample_rate as i32,
            ))
        }
    }
}
