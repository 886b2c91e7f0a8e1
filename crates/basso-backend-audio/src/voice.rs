//! Voice deepening: F0 shift plus formant warp on vocoder features.

use crate::analyzer::WorldFeatures;
use crate::error::AudioResult;
use crate::formant::{warp, WarpFactor};

/// Peak level the resynthesized waveform is scaled to.
pub const OUTPUT_PEAK: f64 = 0.99;

/// Guards against division by zero on silent output.
const PEAK_EPSILON: f64 = 1e-9;

/// Converts a semitone offset to a frequency ratio.
///
/// ```
/// use basso_backend_audio::semitone_to_ratio;
///
/// assert_eq!(semitone_to_ratio(12.0), 2.0);
/// assert_eq!(semitone_to_ratio(0.0), 1.0);
/// ```
pub fn semitone_to_ratio(semitones: f64) -> f64 {
    2.0_f64.powf(semitones / 12.0)
}

/// Scales every voiced F0 value by `ratio`; unvoiced frames stay at 0.
pub fn shift_f0(f0: &mut [f64], ratio: f64) {
    for hz in f0.iter_mut() {
        if *hz != 0.0 {
            *hz *= ratio;
        }
    }
}

/// Applies a pitch shift and a formant warp to analysed features.
///
/// The aperiodicity is carried over untouched.
pub fn deepen(
    features: &WorldFeatures,
    pitch_semitones: f64,
    formant: WarpFactor,
) -> AudioResult<WorldFeatures> {
    let ratio = semitone_to_ratio(pitch_semitones);
    tracing::debug!(
        frames = features.frames(),
        f0_ratio = ratio,
        formant = formant.get(),
        "deepening features"
    );

    let mut f0 = features.f0.clone();
    shift_f0(&mut f0, ratio);

    let spectral_envelope = warp(&features.spectral_envelope, formant)?;

    WorldFeatures::new(
        f0,
        spectral_envelope,
        features.aperiodicity.clone(),
        features.frame_period_ms,
    )
}

/// Scales `samples` so the largest magnitude becomes [`OUTPUT_PEAK`].
pub fn normalize_peak(samples: &mut [f64]) {
    let peak = samples.iter().map(|s| s.abs()).fold(0.0_f64, f64::max);
    let gain = OUTPUT_PEAK / (peak + PEAK_EPSILON);
    for sample in samples.iter_mut() {
        *sample *= gain;
    }
}
