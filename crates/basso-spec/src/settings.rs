//! Voice processing settings.
//!
//! Settings are a plain value passed into every processing request. They
//! are seeded from the environment once at startup and then overridden per
//! request (for example from command-line flags); nothing here is global.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Default pitch shift in semitones (negative is deeper).
pub const DEFAULT_PITCH_SEMITONES: f64 = -6.0;
/// Default formant warp factor; output bin `i` reads the source envelope at
/// bin `i * factor`.
pub const DEFAULT_FORMANT_WARP: f64 = 0.88;
/// Default analysis sample rate in Hz.
pub const DEFAULT_TARGET_SAMPLE_RATE: u32 = 22050;
/// Default ffmpeg bass filter expression.
pub const DEFAULT_BASS_FILTER: &str = "bass=g=8:f=120:w=0.3";
/// Default Opus output bitrate.
pub const DEFAULT_OUTPUT_BITRATE: &str = "64k";
/// Default maximum accepted input duration in seconds.
pub const DEFAULT_MAX_DURATION_SECS: u32 = 45;

/// Cutoff of the low-pass appended after the bass filter, in Hz.
pub const LOWPASS_CUTOFF_HZ: u32 = 8000;

/// Lowest formant warp accepted from users.
pub const FORMANT_WARP_MIN: f64 = 0.6;
/// Highest formant warp accepted from users.
pub const FORMANT_WARP_MAX: f64 = 1.2;

/// Environment variable names read by [`VoiceSettings::from_env`].
pub mod env_vars {
    pub const PITCH_SEMITONES: &str = "PITCH_SEMITONES";
    pub const FORMANT_WARP: &str = "FORMANT_WARP";
    pub const TARGET_SR: &str = "TARGET_SR";
    pub const BASS_FILTER: &str = "BASS_FILTER";
    pub const OUTPUT_BITRATE: &str = "OUTPUT_BITRATE";
    pub const MAX_DURATION: &str = "MAX_DURATION";
}

/// Parameters for one voice-deepening request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// Pitch shift in semitones.
    pub pitch_semitones: f64,
    /// Spectral envelope warp factor.
    pub formant_warp: f64,
    /// Sample rate the input is resampled to before analysis.
    pub target_sample_rate: u32,
    /// ffmpeg audio filter applied before encoding.
    pub bass_filter: String,
    /// Opus bitrate passed to ffmpeg (e.g. "64k").
    pub output_bitrate: String,
    /// Longest input accepted, in seconds.
    pub max_duration_secs: u32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            pitch_semitones: DEFAULT_PITCH_SEMITONES,
            formant_warp: DEFAULT_FORMANT_WARP,
            target_sample_rate: DEFAULT_TARGET_SAMPLE_RATE,
            bass_filter: DEFAULT_BASS_FILTER.to_string(),
            output_bitrate: DEFAULT_OUTPUT_BITRATE.to_string(),
            max_duration_secs: DEFAULT_MAX_DURATION_SECS,
        }
    }
}

impl VoiceSettings {
    /// Loads settings from the process environment, falling back to
    /// defaults for unset variables.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            pitch_semitones: parse_var(&lookup, env_vars::PITCH_SEMITONES)?
                .unwrap_or(defaults.pitch_semitones),
            formant_warp: parse_var(&lookup, env_vars::FORMANT_WARP)?
                .unwrap_or(defaults.formant_warp),
            target_sample_rate: parse_var(&lookup, env_vars::TARGET_SR)?
                .unwrap_or(defaults.target_sample_rate),
            bass_filter: lookup(env_vars::BASS_FILTER).unwrap_or(defaults.bass_filter),
            output_bitrate: lookup(env_vars::OUTPUT_BITRATE).unwrap_or(defaults.output_bitrate),
            max_duration_secs: parse_var(&lookup, env_vars::MAX_DURATION)?
                .unwrap_or(defaults.max_duration_secs),
        })
    }

    /// Returns a copy with a new pitch shift.
    pub fn with_pitch(mut self, semitones: f64) -> Result<Self, SettingsError> {
        if !semitones.is_finite() {
            return Err(SettingsError::InvalidPitch(semitones));
        }
        self.pitch_semitones = semitones;
        Ok(self)
    }

    /// Returns a copy with a new formant warp.
    ///
    /// Only factors in `0.6..=1.2` are accepted; anything outside that
    /// range sounds implausible even though the warp itself would run.
    pub fn with_formant(mut self, warp: f64) -> Result<Self, SettingsError> {
        if !(FORMANT_WARP_MIN..=FORMANT_WARP_MAX).contains(&warp) {
            return Err(SettingsError::FormantOutOfRange {
                value: warp,
                min: FORMANT_WARP_MIN,
                max: FORMANT_WARP_MAX,
            });
        }
        self.formant_warp = warp;
        Ok(self)
    }

    /// Returns a copy with a new target sample rate.
    pub fn with_sample_rate(mut self, rate: u32) -> Self {
        self.target_sample_rate = rate;
        self
    }

    /// Returns a copy with a new bass filter expression.
    pub fn with_bass_filter(mut self, filter: impl Into<String>) -> Self {
        self.bass_filter = filter.into();
        self
    }

    /// Returns a copy with a new output bitrate.
    pub fn with_bitrate(mut self, bitrate: impl Into<String>) -> Self {
        self.output_bitrate = bitrate.into();
        self
    }

    /// Returns a copy with a new maximum duration.
    pub fn with_max_duration(mut self, secs: u32) -> Self {
        self.max_duration_secs = secs;
        self
    }

    /// Full ffmpeg `-af` filter chain used when encoding the result.
    pub fn encode_filter_chain(&self) -> String {
        format!("{},lowpass=f={}", self.bass_filter, LOWPASS_CUTOFF_HZ)
    }

    /// Serializes to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, SettingsError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| SettingsError::InvalidEnvVar {
                name: name.to_string(),
                value: raw.clone(),
                message: e.to_string(),
            }),
    }
}
