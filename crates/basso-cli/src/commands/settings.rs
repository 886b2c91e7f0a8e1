//! Settings command implementation
//!
//! Shows the effective voice settings (environment plus flag overrides) and
//! whether they validate.

use anyhow::{Context, Result};
use basso_spec::{validate_settings, SettingsError, VoiceSettings};
use colored::Colorize;
use serde::Serialize;
use std::process::ExitCode;

use super::FailureOutput;

/// Per-invocation overrides layered on top of the environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsOverrides {
    pub pitch: Option<f64>,
    pub formant: Option<f64>,
    pub sample_rate: Option<u32>,
    pub bass_filter: Option<String>,
    pub bitrate: Option<String>,
    pub max_duration: Option<u32>,
}

impl SettingsOverrides {
    /// Applies the overrides. Pitch and formant go through the same checks
    /// as interactive changes.
    pub fn apply(&self, mut settings: VoiceSettings) -> Result<VoiceSettings, SettingsError> {
        if let Some(pitch) = self.pitch {
            settings = settings.with_pitch(pitch)?;
        }
        if let Some(formant) = self.formant {
            settings = settings.with_formant(formant)?;
        }
        if let Some(rate) = self.sample_rate {
            settings = settings.with_sample_rate(rate);
        }
        if let Some(filter) = &self.bass_filter {
            settings = settings.with_bass_filter(filter.clone());
        }
        if let Some(bitrate) = &self.bitrate {
            settings = settings.with_bitrate(bitrate.clone());
        }
        if let Some(secs) = self.max_duration {
            settings = settings.with_max_duration(secs);
        }
        Ok(settings)
    }
}

/// Loads settings from the environment and applies `overrides`.
pub fn load_settings(overrides: &SettingsOverrides) -> Result<VoiceSettings, SettingsError> {
    load_settings_from(overrides, |name| std::env::var(name).ok())
}

/// Like [`load_settings`], reading variables through `lookup`.
pub fn load_settings_from<F>(
    overrides: &SettingsOverrides,
    lookup: F,
) -> Result<VoiceSettings, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    overrides.apply(VoiceSettings::from_lookup(lookup)?)
}

#[derive(Serialize)]
struct SettingsOutput<'a> {
    ok: bool,
    settings: &'a VoiceSettings,
    encode_filter_chain: String,
    errors: Vec<String>,
}

/// Run the settings command
///
/// # Returns
/// Exit code: 0 if the effective settings are valid, 1 otherwise
pub fn run(overrides: &SettingsOverrides, json_output: bool) -> Result<ExitCode> {
    let settings = match load_settings(overrides) {
        Ok(settings) => settings,
        Err(err) if json_output => {
            println!("{}", FailureOutput::from_error(&err).to_json_pretty()?);
            return Ok(ExitCode::from(1));
        }
        Err(err) => return Err::<ExitCode, _>(err).context("failed to load settings"),
    };
    let validation = validate_settings(&settings);
    let errors: Vec<String> = validation.errors.iter().map(ToString::to_string).collect();

    if json_output {
        let output = SettingsOutput {
            ok: validation.is_ok(),
            settings: &settings,
            encode_filter_chain: settings.encode_filter_chain(),
            errors,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", "Voice settings".cyan().bold());
        println!("  pitch shift     {:+} semitones", settings.pitch_semitones);
        println!("  formant warp    {}", settings.formant_warp);
        println!("  sample rate     {} Hz", settings.target_sample_rate);
        println!("  bass filter     {}", settings.bass_filter);
        println!("  encode filters  {}", settings.encode_filter_chain().dimmed());
        println!("  bitrate         {}", settings.output_bitrate);
        println!("  max duration    {} s", settings.max_duration_secs);
        println!();
        if validation.is_ok() {
            println!("{} settings are valid", "ok".green());
        } else {
            for error in &errors {
                println!("{} {}", "!!".red(), error);
            }
        }
    }

    Ok(if validation.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
