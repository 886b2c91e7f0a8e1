//! Error types for the transcoding backend.

use basso_spec::BackendError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for transcoding operations.
pub type TranscodeResult<T> = Result<T, TranscodeError>;

/// Errors that can occur while transcoding audio.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// ffmpeg executable not found.
    #[error("ffmpeg executable not found. Ensure ffmpeg is installed and in PATH, or set FFMPEG_PATH environment variable")]
    FfmpegNotFound,

    /// Failed to spawn the ffmpeg process.
    #[error("Failed to spawn ffmpeg process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    /// ffmpeg timed out.
    #[error("ffmpeg timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// ffmpeg exited with non-zero status.
    #[error("ffmpeg exited with status {exit_code}: {stderr}")]
    ProcessFailed { exit_code: i32, stderr: String },

    /// Input file does not exist.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// ffmpeg succeeded but produced no output file.
    #[error("Expected output file not found: {path}")]
    OutputNotFound { path: PathBuf },

    /// Invalid encoding option.
    #[error("Invalid encode option '{name}': {message}")]
    InvalidOption { name: String, message: String },

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TranscodeError {
    /// Creates a new process failed error.
    pub fn process_failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::ProcessFailed {
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Creates a new invalid option error.
    pub fn invalid_option(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOption {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl BackendError for TranscodeError {
    fn code(&self) -> &'static str {
        match self {
            TranscodeError::FfmpegNotFound => "FFMPEG_001",
            TranscodeError::SpawnFailed(_) => "FFMPEG_002",
            TranscodeError::Timeout { .. } => "FFMPEG_003",
            TranscodeError::ProcessFailed { .. } => "FFMPEG_004",
            TranscodeError::InputNotFound { .. } => "FFMPEG_005",
            TranscodeError::OutputNotFound { .. } => "FFMPEG_006",
            TranscodeError::InvalidOption { .. } => "FFMPEG_007",
            TranscodeError::Io(_) => "FFMPEG_008",
        }
    }

    fn category(&self) -> &'static str {
        "ffmpeg"
    }
}
