//! Frame-by-bin magnitude spectra.

use crate::error::{AudioError, AudioResult};

/// A per-frame magnitude spectrum, stored row-major as `frames x bins`.
///
/// Bin 0 is DC and bin `bins - 1` is Nyquist. Both dimensions are always
/// non-zero.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralEnvelope {
    frames: usize,
    bins: usize,
    data: Vec<f64>,
}

impl SpectralEnvelope {
    /// Creates a zero-filled envelope.
    pub fn zeros(frames: usize, bins: usize) -> AudioResult<Self> {
        check_dims(frames, bins)?;
        Ok(Self {
            frames,
            bins,
            data: vec![0.0; frames * bins],
        })
    }

    /// Wraps a row-major buffer of `frames * bins` values.
    pub fn from_flat(frames: usize, bins: usize, data: Vec<f64>) -> AudioResult<Self> {
        check_dims(frames, bins)?;
        if data.len() != frames * bins {
            return Err(AudioError::invalid_shape(format!(
                "buffer holds {} values, expected {} frames x {} bins",
                data.len(),
                frames,
                bins
            )));
        }
        Ok(Self { frames, bins, data })
    }

    /// Builds an envelope from one vector per frame.
    ///
    /// Every frame must have the same, non-zero length.
    pub fn from_frames(rows: Vec<Vec<f64>>) -> AudioResult<Self> {
        let frames = rows.len();
        let bins = rows.first().map(Vec::len).unwrap_or(0);
        check_dims(frames, bins)?;

        let mut data = Vec::with_capacity(frames * bins);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != bins {
                return Err(AudioError::invalid_shape(format!(
                    "frame {} has {} bins, expected {}",
                    i,
                    row.len(),
                    bins
                )));
            }
            data.extend(row);
        }
        Ok(Self { frames, bins, data })
    }

    /// Number of frames.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Number of bins per frame.
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Returns `(frames, bins)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.frames, self.bins)
    }

    /// Returns one frame.
    ///
    /// # Panics
    /// Panics if `index >= frames()`.
    pub fn frame(&self, index: usize) -> &[f64] {
        let start = index * self.bins;
        &self.data[start..start + self.bins]
    }

    /// Returns one frame mutably.
    ///
    /// # Panics
    /// Panics if `index >= frames()`.
    pub fn frame_mut(&mut self, index: usize) -> &mut [f64] {
        let start = index * self.bins;
        &mut self.data[start..start + self.bins]
    }

    /// Iterates over frames in order.
    pub fn iter_frames(&self) -> std::slice::Chunks<'_, f64> {
        self.data.chunks(self.bins)
    }

    /// The row-major backing buffer.
    pub fn as_flat(&self) -> &[f64] {
        &self.data
    }

    pub(crate) fn as_flat_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Splits back into one vector per frame.
    pub fn into_frames(self) -> Vec<Vec<f64>> {
        self.data.chunks(self.bins).map(<[f64]>::to_vec).collect()
    }
}

fn check_dims(frames: usize, bins: usize) -> AudioResult<()> {
    if frames == 0 {
        return Err(AudioError::invalid_shape("envelope has zero frames"));
    }
    if bins == 0 {
        return Err(AudioError::invalid_shape("envelope has zero bins"));
    }
    Ok(())
}
