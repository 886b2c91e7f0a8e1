//! The transcoding capability used by the voice pipeline.

use std::path::Path;

use basso_spec::VoiceSettings;

use crate::error::{TranscodeError, TranscodeResult};

/// Codec used for voice replies.
pub const DEFAULT_CODEC: &str = "libopus";

/// How the processed WAV is filtered and encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// ffmpeg `-af` filter chain.
    pub filter_chain: String,
    /// ffmpeg audio codec name.
    pub codec: String,
    /// Target bitrate, e.g. "64k".
    pub bitrate: String,
}

impl EncodeOptions {
    /// Derives encode options from voice settings: bass filter followed by
    /// an 8 kHz low-pass, Opus at the configured bitrate.
    pub fn from_settings(settings: &VoiceSettings) -> Self {
        Self {
            filter_chain: settings.encode_filter_chain(),
            codec: DEFAULT_CODEC.to_string(),
            bitrate: settings.output_bitrate.clone(),
        }
    }

    /// Rejects empty fields before they reach the command line.
    pub fn validate(&self) -> TranscodeResult<()> {
        if self.codec.trim().is_empty() {
            return Err(TranscodeError::invalid_option("codec", "must not be empty"));
        }
        if self.bitrate.trim().is_empty() {
            return Err(TranscodeError::invalid_option("bitrate", "must not be empty"));
        }
        Ok(())
    }
}

/// Converts between container formats around the signal processing.
pub trait Transcoder {
    /// Decodes any supported input to mono WAV at `sample_rate`.
    fn decode(&self, input: &Path, output_wav: &Path, sample_rate: u32) -> TranscodeResult<()>;

    /// Filters and encodes a WAV into the final voice format.
    fn encode(&self, input_wav: &Path, output: &Path, options: &EncodeOptions)
        -> TranscodeResult<()>;
}
