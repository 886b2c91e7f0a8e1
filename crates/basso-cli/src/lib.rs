//! Basso CLI library.
//!
//! Holds the voice pipeline that ties decoding, WORLD analysis, formant
//! warping and encoding together, plus the command implementations used by
//! the `basso` binary.

pub mod commands;
pub mod pipeline;

pub use pipeline::{deepen_samples, DeepenedAudio, PipelineError, VoicePipeline, VoiceRequest};
