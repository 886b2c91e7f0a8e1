//! Error types for settings loading and validation.

use thiserror::Error;

/// Error codes for settings validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// S001: Pitch shift is not a finite number
    NonFinitePitch,
    /// S002: Formant warp outside the accepted range
    FormantOutOfRange,
    /// S003: Target sample rate is zero
    InvalidSampleRate,
    /// S004: Bass filter expression is empty
    EmptyBassFilter,
    /// S005: Output bitrate is not of the form `<n>k`
    InvalidBitrate,
    /// S006: Maximum duration is zero
    InvalidMaxDuration,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "S001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::NonFinitePitch => "S001",
            ErrorCode::FormantOutOfRange => "S002",
            ErrorCode::InvalidSampleRate => "S003",
            ErrorCode::EmptyBassFilter => "S004",
            ErrorCode::InvalidBitrate => "S005",
            ErrorCode::InvalidMaxDuration => "S006",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A validation error with code, message, and the offending settings field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// Settings field the error refers to (e.g., "formant_warp").
    pub field: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    /// Creates a new validation error attached to a settings field.
    pub fn with_field(code: ErrorCode, message: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref field) = self.field {
            write!(f, "{}: {} (at {})", self.code, self.message, field)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// Result of settings validation.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether validation passed (no errors).
    pub ok: bool,
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Creates a successful validation result.
    pub fn success() -> Self {
        Self {
            ok: true,
            errors: Vec::new(),
        }
    }

    /// Adds an error to the result.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
        self.ok = false;
    }

    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// Converts to a Result, returning Err if there are errors.
    pub fn into_result(self) -> Result<(), Vec<ValidationError>> {
        if self.ok {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::success()
    }
}

/// Errors raised while building settings from the environment or arguments.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An environment variable held a value that could not be parsed.
    #[error("environment variable {name} has invalid value '{value}': {message}")]
    InvalidEnvVar {
        /// Variable name.
        name: String,
        /// Raw value.
        value: String,
        /// Parse failure.
        message: String,
    },

    /// Pitch shift must be a finite number of semitones.
    #[error("invalid pitch shift {0}: expected a finite number of semitones")]
    InvalidPitch(f64),

    /// Formant warp outside the accepted range.
    #[error("formant warp {value} is outside the accepted range {min}..={max}; output bin i reads source bin i * warp")]
    FormantOutOfRange {
        /// Rejected value.
        value: f64,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BackendError for SettingsError {
    fn code(&self) -> &'static str {
        match self {
            SettingsError::InvalidEnvVar { .. } => "SETTINGS_001",
            SettingsError::InvalidPitch(_) => "SETTINGS_002",
            SettingsError::FormantOutOfRange { .. } => "SETTINGS_003",
            SettingsError::Json(_) => "SETTINGS_004",
        }
    }

    fn category(&self) -> &'static str {
        "settings"
    }
}

/// Common trait for backend errors.
///
/// This trait provides a unified interface for error reporting across all
/// backends:
/// - Consistent error codes for reporting
/// - Human-readable messages for users
/// - A category for grouping related errors
///
/// # Example
///
/// ```ignore
/// use basso_spec::BackendError;
///
/// fn handle_error<E: BackendError>(err: E) {
///     eprintln!("[{}] {}", err.code(), err.message());
/// }
/// ```
pub trait BackendError: std::error::Error {
    /// Get the error code for reporting.
    ///
    /// Returns a static string like "AUDIO_001" or "FFMPEG_002".
    /// These codes are stable and can be used for programmatic error handling.
    fn code(&self) -> &'static str;

    /// Get a human-readable message describing the error.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Get the error category for grouping related errors.
    ///
    /// Returns a category like "audio", "ffmpeg", "pipeline".
    fn category(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_strings() {
        assert_eq!(ErrorCode::NonFinitePitch.code(), "S001");
        assert_eq!(ErrorCode::FormantOutOfRange.code(), "S002");
        assert_eq!(ErrorCode::InvalidMaxDuration.to_string(), "S006");
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::with_field(
            ErrorCode::FormantOutOfRange,
            "formant warp 2 is outside 0.6..=1.2",
            "formant_warp",
        );
        assert_eq!(
            err.to_string(),
            "S002: formant warp 2 is outside 0.6..=1.2 (at formant_warp)"
        );

        let err = ValidationError::new(ErrorCode::EmptyBassFilter, "bass filter is empty");
        assert_eq!(err.to_string(), "S004: bass filter is empty");
    }

    #[test]
    fn test_validation_result_tracks_errors() {
        let mut result = ValidationResult::success();
        assert!(result.is_ok());

        result.add_error(ValidationError::new(ErrorCode::InvalidSampleRate, "zero"));
        assert!(!result.is_ok());
        assert_eq!(result.into_result().unwrap_err().len(), 1);
    }

    #[test]
    fn test_settings_error_display() {
        let err = SettingsError::FormantOutOfRange {
            value: 1.5,
            min: 0.6,
            max: 1.2,
        };
        assert!(err.to_string().contains("1.5"));
        assert!(err.to_string().contains("source bin i * warp"));
        assert!(!err.to_string().contains("deeper"));
        assert_eq!(err.code(), "SETTINGS_003");

        let err = SettingsError::InvalidEnvVar {
            name: "TARGET_SR".to_string(),
            value: "fast".to_string(),
            message: "invalid digit found in string".to_string(),
        };
        assert!(err.to_string().contains("TARGET_SR"));
        assert!(err.to_string().contains("fast"));
        assert_eq!(err.code(), "SETTINGS_001");
        assert_eq!(err.category(), "settings");
    }
}
