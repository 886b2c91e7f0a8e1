//! Settings validation logic.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{ErrorCode, ValidationError, ValidationResult};
use crate::settings::{VoiceSettings, FORMANT_WARP_MAX, FORMANT_WARP_MIN};

/// Bitrates are passed to ffmpeg in kilobit form, e.g. "64k".
const BITRATE_PATTERN: &str = r"^[1-9][0-9]*k$";

static BITRATE_REGEX: OnceLock<Regex> = OnceLock::new();

fn bitrate_regex() -> &'static Regex {
    BITRATE_REGEX.get_or_init(|| Regex::new(BITRATE_PATTERN).expect("invalid regex pattern"))
}

/// Validates settings and returns every problem found.
///
/// # Example
/// ```
/// use basso_spec::{validate_settings, VoiceSettings};
///
/// let result = validate_settings(&VoiceSettings::default());
/// assert!(result.is_ok());
/// ```
pub fn validate_settings(settings: &VoiceSettings) -> ValidationResult {
    let mut result = ValidationResult::default();

    validate_pitch(settings, &mut result);
    validate_formant(settings, &mut result);
    validate_sample_rate(settings, &mut result);
    validate_bass_filter(settings, &mut result);
    validate_bitrate(settings, &mut result);
    validate_max_duration(settings, &mut result);

    result
}

/// Returns true if `duration_secs` is within the configured limit.
pub fn duration_within_limit(duration_secs: f64, settings: &VoiceSettings) -> bool {
    duration_secs <= settings.max_duration_secs as f64
}

fn validate_pitch(settings: &VoiceSettings, result: &mut ValidationResult) {
    if !settings.pitch_semitones.is_finite() {
        result.add_error(ValidationError::with_field(
            ErrorCode::NonFinitePitch,
            format!(
                "pitch shift must be a finite number of semitones, got {}",
                settings.pitch_semitones
            ),
            "pitch_semitones",
        ));
    }
}

fn validate_formant(settings: &VoiceSettings, result: &mut ValidationResult) {
    if !(FORMANT_WARP_MIN..=FORMANT_WARP_MAX).contains(&settings.formant_warp) {
        result.add_error(ValidationError::with_field(
            ErrorCode::FormantOutOfRange,
            format!(
                "formant warp must be between {} and {}, got {}",
                FORMANT_WARP_MIN, FORMANT_WARP_MAX, settings.formant_warp
            ),
            "formant_warp",
        ));
    }
}

fn validate_sample_rate(settings: &VoiceSettings, result: &mut ValidationResult) {
    if settings.target_sample_rate == 0 {
        result.add_error(ValidationError::with_field(
            ErrorCode::InvalidSampleRate,
            "target sample rate must be positive",
            "target_sample_rate",
        ));
    }
}

fn validate_bass_filter(settings: &VoiceSettings, result: &mut ValidationResult) {
    if settings.bass_filter.trim().is_empty() {
        result.add_error(ValidationError::with_field(
            ErrorCode::EmptyBassFilter,
            "bass filter expression must not be empty",
            "bass_filter",
        ));
    }
}

fn validate_bitrate(settings: &VoiceSettings, result: &mut ValidationResult) {
    if !bitrate_regex().is_match(&settings.output_bitrate) {
        result.add_error(ValidationError::with_field(
            ErrorCode::InvalidBitrate,
            format!(
                "output bitrate must look like '64k', got '{}'",
                settings.output_bitrate
            ),
            "output_bitrate",
        ));
    }
}

fn validate_max_duration(settings: &VoiceSettings, result: &mut ValidationResult) {
    if settings.max_duration_secs == 0 {
        result.add_error(ValidationError::with_field(
            ErrorCode::InvalidMaxDuration,
            "maximum duration must be at least one second",
            "max_duration_secs",
        ));
    }
}
