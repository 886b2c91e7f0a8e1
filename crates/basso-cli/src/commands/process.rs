//! Process command implementation
//!
//! Deepens one recorded voice message and writes the encoded result.

use anyhow::{Context, Result};
use basso_backend_audio::PitchAnalyzer;
use basso_backend_ffmpeg::Transcoder;
use basso_spec::{ProcessReport, VoiceSettings};
use colored::Colorize;
use std::process::ExitCode;

use super::settings::{load_settings, SettingsOverrides};
use super::FailureOutput;
use crate::pipeline::{PipelineError, VoicePipeline, VoiceRequest};

/// Exit code used when the input is longer than the configured limit.
pub const EXIT_TOO_LONG: u8 = 2;

/// Run the process command
///
/// # Arguments
/// * `request` - Input, output and optional declared duration
/// * `overrides` - Flag overrides applied on top of the environment
/// * `ffmpeg_path` - Explicit ffmpeg executable, if any
/// * `json_output` - Whether to print the report (or the failure) as JSON
///
/// # Returns
/// Exit code: 0 on success, 2 if the input is too long, 1 on other failures
pub fn run(
    request: VoiceRequest,
    overrides: &SettingsOverrides,
    ffmpeg_path: Option<&str>,
    json_output: bool,
) -> Result<ExitCode> {
    let settings = match load_settings(overrides) {
        Ok(settings) => settings,
        Err(err) => return report_failure(err.into(), &request, json_output),
    };
    run_world(&request, &settings, ffmpeg_path, json_output)
}

#[cfg(feature = "world")]
fn run_world(
    request: &VoiceRequest,
    settings: &VoiceSettings,
    ffmpeg_path: Option<&str>,
    json_output: bool,
) -> Result<ExitCode> {
    let pipeline = VoicePipeline::new(
        basso_backend_audio::WorldAnalyzer::new(),
        super::ffmpeg_transcoder(ffmpeg_path),
    );
    run_with(&pipeline, request, settings, json_output)
}

/// Without the WORLD vocoder linked there is nothing to analyze with.
#[cfg(not(feature = "world"))]
fn run_world(
    request: &VoiceRequest,
    _settings: &VoiceSettings,
    _ffmpeg_path: Option<&str>,
    json_output: bool,
) -> Result<ExitCode> {
    report_failure(PipelineError::AnalyzerUnavailable, request, json_output)
}

/// Runs a request through an already-assembled pipeline and prints the
/// outcome.
pub fn run_with<A, T>(
    pipeline: &VoicePipeline<A, T>,
    request: &VoiceRequest,
    settings: &VoiceSettings,
    json_output: bool,
) -> Result<ExitCode>
where
    A: PitchAnalyzer,
    T: Transcoder,
{
    if !json_output {
        println!("{} {}", "Processing:".cyan().bold(), request.input.display());
    }

    match pipeline.process(request, settings) {
        Ok(report) => {
            if json_output {
                println!("{}", report.to_json_pretty()?);
            } else {
                print_report(&report);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err @ PipelineError::TooLong { .. }) => {
            if json_output {
                print_failure(&err)?;
            } else {
                println!("{} {}", "!!".yellow(), err);
            }
            Ok(ExitCode::from(EXIT_TOO_LONG))
        }
        Err(err) => report_failure(err, request, json_output),
    }
}

/// Prints `err` as a [`FailureOutput`] in JSON mode (exit 1), otherwise
/// returns it with context.
fn report_failure(err: PipelineError, request: &VoiceRequest, json_output: bool) -> Result<ExitCode> {
    if json_output {
        print_failure(&err)?;
        Ok(ExitCode::from(1))
    } else {
        Err::<ExitCode, _>(err)
            .with_context(|| format!("failed to process {}", request.input.display()))
    }
}

fn print_failure(err: &PipelineError) -> Result<()> {
    println!("{}", FailureOutput::from_error(err).to_json_pretty()?);
    Ok(())
}

fn print_report(report: &ProcessReport) {
    println!(
        "  {} {:.2}s of audio, {} frames x {} bins, {:.0}% voiced",
        "->".green(),
        report.input_duration_secs,
        report.frame_count,
        report.bin_count,
        report.voiced_ratio * 100.0
    );
    for stage in &report.stages {
        println!(
            "  {} {:<7} {}",
            "->".green(),
            stage.stage,
            format!("{} ms", stage.duration_ms).dimmed()
        );
    }
    println!(
        "{} {} ({} ms)",
        "Wrote:".green().bold(),
        report.output.display(),
        report.duration_ms
    );
}
