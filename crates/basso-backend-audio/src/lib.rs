//! Basso Audio Backend
//!
//! This crate holds the signal side of Basso: it turns analysed vocoder
//! features of a voice into those of a deeper voice.
//!
//! # Overview
//!
//! - **Formant warp** - resamples each frame of a spectral envelope along
//!   its frequency axis by a scalar factor
//! - **Pitch shift** - scales the voiced part of an F0 track by a semitone
//!   ratio
//! - **Analysis/resynthesis** - the [`PitchAnalyzer`] capability, with a
//!   WORLD implementation behind the `world` feature
//! - **WAV I/O** - mono float WAV in and out
//!
//! # Example
//!
//! ```
//! use basso_backend_audio::{warp, SpectralEnvelope, WarpFactor};
//!
//! let envelope = SpectralEnvelope::from_frames(vec![
//!     vec![0.0, 1.0, 4.0, 1.0, 0.0],
//! ])?;
//! let warped = warp(&envelope, WarpFactor::new(0.5)?)?;
//!
//! assert_eq!(warped.frame(0), &[0.0, 0.5, 1.0, 2.5, 4.0]);
//! # Ok::<(), basso_backend_audio::AudioError>(())
//! ```
//!
//! # Crate Structure
//!
//! - [`envelope`] - Frame-by-bin spectra
//! - [`formant`] - Spectral envelope warp
//! - [`voice`] - F0 shift, deepening and peak normalisation
//! - [`analyzer`] - Vocoder features and the `PitchAnalyzer` trait
//! - [`wav`] - WAV reading and writing

pub mod analyzer;
pub mod envelope;
pub mod error;
pub mod formant;
pub mod voice;
pub mod wav;

// Re-export main types at crate root
pub use analyzer::{PitchAnalyzer, WorldFeatures, DEFAULT_FRAME_PERIOD_MS};
pub use envelope::SpectralEnvelope;
pub use error::{AudioError, AudioResult};
pub use formant::{target_positions, warp, warp_frame_into, warp_into, WarpFactor};
pub use voice::{deepen, normalize_peak, semitone_to_ratio, shift_f0, OUTPUT_PEAK};
pub use wav::{read_wav_mono, write_wav_f32, MonoAudio};

#[cfg(feature = "world")]
pub use analyzer::WorldAnalyzer;
