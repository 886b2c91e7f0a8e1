//! Spectral envelope (formant) warping.
//!
//! Each frame of the envelope is resampled along its frequency axis: output
//! bin `i` takes the input's value at fractional bin `i * factor`, clamped
//! into `[0, bins - 1]` and linearly interpolated between neighbouring
//! bins. No smoothing and no energy renormalisation are applied, so the
//! total energy of a frame changes with the factor.
//!
//! Frames are independent and are processed in parallel.

use rayon::prelude::*;

use crate::envelope::SpectralEnvelope;
use crate::error::{AudioError, AudioResult};

/// Frequency-axis scale applied by [`warp`].
///
/// Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct WarpFactor(f64);

impl WarpFactor {
    /// The identity warp.
    pub const IDENTITY: WarpFactor = WarpFactor(1.0);

    /// Creates a warp factor, rejecting zero, negative and non-finite values.
    pub fn new(factor: f64) -> AudioResult<Self> {
        if factor.is_finite() && factor > 0.0 {
            Ok(Self(factor))
        } else {
            Err(AudioError::InvalidFactor { factor })
        }
    }

    /// Returns the raw factor.
    pub fn get(self) -> f64 {
        self.0
    }

    /// Returns the factor that undoes this one.
    pub fn inverse(self) -> Self {
        Self(1.0 / self.0)
    }
}

impl TryFrom<f64> for WarpFactor {
    type Error = AudioError;

    fn try_from(factor: f64) -> AudioResult<Self> {
        Self::new(factor)
    }
}

/// Warps every frame of `envelope` by `factor` into a new envelope of the
/// same shape.
///
/// # Example
/// ```
/// use basso_backend_audio::{warp, SpectralEnvelope, WarpFactor};
///
/// let env = SpectralEnvelope::from_frames(vec![vec![0.0, 1.0, 4.0, 1.0, 0.0]]).unwrap();
/// let warped = warp(&env, WarpFactor::new(0.5).unwrap()).unwrap();
/// assert_eq!(warped.frame(0), &[0.0, 0.5, 1.0, 2.5, 4.0]);
/// ```
pub fn warp(envelope: &SpectralEnvelope, factor: WarpFactor) -> AudioResult<SpectralEnvelope> {
    let mut output = SpectralEnvelope::zeros(envelope.frames(), envelope.bins())?;
    warp_into(envelope, factor, &mut output)?;
    Ok(output)
}

/// Warps `envelope` into a caller-provided buffer.
///
/// `output` must have exactly the same shape as `envelope`.
pub fn warp_into(
    envelope: &SpectralEnvelope,
    factor: WarpFactor,
    output: &mut SpectralEnvelope,
) -> AudioResult<()> {
    if output.shape() != envelope.shape() {
        return Err(AudioError::invalid_shape(format!(
            "output is {}x{}, input is {}x{}",
            output.frames(),
            output.bins(),
            envelope.frames(),
            envelope.bins()
        )));
    }

    let bins = envelope.bins();
    let positions = target_positions(bins, factor);

    output
        .as_flat_mut()
        .par_chunks_mut(bins)
        .zip(envelope.as_flat().par_chunks(bins))
        .for_each(|(dst, src)| resample_frame(src, &positions, dst));

    Ok(())
}

/// Warps a single frame into `output`, which must be the same length.
pub fn warp_frame_into(frame: &[f64], factor: WarpFactor, output: &mut [f64]) -> AudioResult<()> {
    if frame.is_empty() {
        return Err(AudioError::invalid_shape("frame has zero bins"));
    }
    if output.len() != frame.len() {
        return Err(AudioError::invalid_shape(format!(
            "output frame has {} bins, input has {}",
            output.len(),
            frame.len()
        )));
    }
    let positions = target_positions(frame.len(), factor);
    resample_frame(frame, &positions, output);
    Ok(())
}

/// Fractional source bin read by each output bin, already clamped into
/// `[0, bins - 1]`.
///
/// This is `linspace(0, 1, bins) * factor * (bins - 1)`, computed as
/// `i * factor` so the identity factor lands exactly on integer bins.
pub fn target_positions(bins: usize, factor: WarpFactor) -> Vec<f64> {
    let last = bins.saturating_sub(1) as f64;
    (0..bins)
        .map(|i| (i as f64 * factor.get()).clamp(0.0, last))
        .collect()
}

fn resample_frame(src: &[f64], positions: &[f64], dst: &mut [f64]) {
    for (out, &pos) in dst.iter_mut().zip(positions) {
        *out = sample_linear(src, pos);
    }
}

/// Reads `frame` at a fractional bin, holding the edge values outside the
/// sampled range.
#[inline]
fn sample_linear(frame: &[f64], pos: f64) -> f64 {
    let last = frame.len() - 1;
    if pos <= 0.0 {
        return frame[0];
    }
    if pos >= last as f64 {
        return frame[last];
    }

    let lo = pos.floor() as usize;
    let t = pos - lo as f64;
    if t == 0.0 {
        return frame[lo];
    }
    // Convex combination: non-negative inputs stay non-negative.
    frame[lo] * (1.0 - t) + frame[lo + 1] * t
}
