//! CLI command implementations

pub mod doctor;
pub mod process;
pub mod settings;

use basso_backend_ffmpeg::{FfmpegConfig, FfmpegTranscoder};
use basso_spec::BackendError;
use serde::{Deserialize, Serialize};

/// Builds an ffmpeg transcoder, optionally pinned to an explicit executable.
pub fn ffmpeg_transcoder(ffmpeg_path: Option<&str>) -> FfmpegTranscoder {
    match ffmpeg_path {
        Some(path) => FfmpegTranscoder::with_config(FfmpegConfig::default().ffmpeg_path(path)),
        None => FfmpegTranscoder::new(),
    }
}

/// Machine-readable failure printed by commands run with `--json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureOutput {
    pub ok: bool,
    pub code: String,
    pub category: String,
    pub message: String,
}

impl FailureOutput {
    /// Describes a backend error.
    pub fn from_error<E: BackendError + ?Sized>(err: &E) -> Self {
        Self {
            ok: false,
            code: err.code().to_string(),
            category: err.category().to_string(),
            message: err.message(),
        }
    }

    /// Serializes to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
