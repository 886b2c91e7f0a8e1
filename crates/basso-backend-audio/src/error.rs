//! Error types for the audio backend.

use basso_spec::BackendError;
use thiserror::Error;

/// Result type for audio operations.
pub type AudioResult<T> = Result<T, AudioError>;

/// Errors that can occur while transforming or resynthesizing audio.
#[derive(Debug, Error)]
pub enum AudioError {
    /// Envelope has zero frames or bins, or buffers disagree on shape.
    #[error("invalid envelope shape: {message}")]
    InvalidShape {
        /// What was wrong with the shape.
        message: String,
    },

    /// Warp factor is not a finite positive number.
    #[error("invalid warp factor {factor}: must be a finite positive number")]
    InvalidFactor {
        /// The rejected factor.
        factor: f64,
    },

    /// Invalid sample rate.
    #[error("invalid sample rate: {rate}")]
    InvalidSampleRate {
        /// The invalid sample rate.
        rate: u32,
    },

    /// Analysis features disagree with each other.
    #[error("inconsistent analysis features: {message}")]
    InconsistentFeatures {
        /// What disagreed.
        message: String,
    },

    /// The external analysis or synthesis step failed.
    #[error("analysis error: {message}")]
    Analysis {
        /// Error message.
        message: String,
    },

    /// WAV decoding or encoding error.
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AudioError {
    /// Creates an invalid shape error.
    pub fn invalid_shape(message: impl Into<String>) -> Self {
        Self::InvalidShape {
            message: message.into(),
        }
    }

    /// Creates an inconsistent features error.
    pub fn inconsistent(message: impl Into<String>) -> Self {
        Self::InconsistentFeatures {
            message: message.into(),
        }
    }

    /// Creates an analysis error.
    pub fn analysis(message: impl Into<String>) -> Self {
        Self::Analysis {
            message: message.into(),
        }
    }
}

impl BackendError for AudioError {
    fn code(&self) -> &'static str {
        match self {
            AudioError::InvalidShape { .. } => "AUDIO_001",
            AudioError::InvalidFactor { .. } => "AUDIO_002",
            AudioError::InvalidSampleRate { .. } => "AUDIO_003",
            AudioError::InconsistentFeatures { .. } => "AUDIO_004",
            AudioError::Analysis { .. } => "AUDIO_005",
            AudioError::Wav(_) => "AUDIO_006",
            AudioError::Io(_) => "AUDIO_007",
        }
    }

    fn category(&self) -> &'static str {
        "audio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_shape_helper() {
        let err = AudioError::invalid_shape("envelope has zero bins");
        assert!(err.to_string().contains("zero bins"));
        assert_eq!(err.code(), "AUDIO_001");
    }

    #[test]
    fn test_invalid_factor_display() {
        let err = AudioError::InvalidFactor { factor: -0.5 };
        assert!(err.to_string().contains("-0.5"));
        assert_eq!(err.code(), "AUDIO_002");
        assert_eq!(err.category(), "audio");
    }
}
