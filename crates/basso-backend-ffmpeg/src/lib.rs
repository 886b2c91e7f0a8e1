//! Basso transcoding backend
//!
//! Telegram voice messages arrive as Ogg/Opus, while the vocoder works on
//! mono PCM. This crate converts between the two by driving an `ffmpeg`
//! subprocess:
//!
//! - **decode**: any input to mono WAV at the analysis sample rate
//! - **encode**: processed WAV through the bass filter and an 8 kHz
//!   low-pass into Opus
//!
//! The [`Transcoder`] trait keeps callers independent of ffmpeg so they can
//! be tested without it.
//!
//! # Requirements
//!
//! ffmpeg must be installed and discoverable (in PATH, or via `FFMPEG_PATH`),
//! built with `libopus`.

pub mod error;
pub mod ffmpeg;
pub mod transcoder;

pub use error::{TranscodeError, TranscodeResult};
pub use ffmpeg::{decode_args, encode_args, FfmpegConfig, FfmpegTranscoder, DEFAULT_TIMEOUT_SECS};
pub use transcoder::{EncodeOptions, Transcoder, DEFAULT_CODEC};
