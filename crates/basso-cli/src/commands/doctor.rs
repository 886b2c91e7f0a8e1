//! Doctor command implementation
//!
//! Checks that ffmpeg is reachable, that the vocoder is linked in and that
//! the environment settings are usable.

use anyhow::Result;
use basso_spec::{validate_settings, VoiceSettings};
use colored::Colorize;
use std::process::ExitCode;

use super::ffmpeg_transcoder;

/// Run the doctor command
///
/// # Returns
/// Exit code: 0 if all checks pass, 1 if any fail
pub fn run(ffmpeg_path: Option<&str>) -> Result<ExitCode> {
    println!("{}", "Basso Doctor".cyan().bold());
    println!("{}", "============".cyan());
    println!();

    let mut all_ok = true;

    println!("{}", "Versions:".bold());
    println!("  {} basso-cli v{}", "->".green(), env!("CARGO_PKG_VERSION"));
    println!();

    println!("{}", "Dependencies:".bold());
    let transcoder = ffmpeg_transcoder(ffmpeg_path);
    match transcoder.find_ffmpeg() {
        Ok(path) => match transcoder.version() {
            Ok(version) => {
                println!("  {} {} ({})", "ok".green(), version, path.display());
            }
            Err(e) => {
                println!("  {} ffmpeg at {} failed: {}", "!!".red(), path.display(), e);
                all_ok = false;
            }
        },
        Err(e) => {
            println!("  {} {}", "!!".red(), e);
            println!(
                "     {}",
                "ffmpeg with libopus is required to decode and encode voice messages.".dimmed()
            );
            all_ok = false;
        }
    }

    if cfg!(feature = "world") {
        println!("  {} WORLD vocoder linked", "ok".green());
    } else {
        println!("  {} WORLD vocoder not linked", "!!".yellow());
        println!(
            "     {}",
            "Rebuild with `--features world` to enable `basso process`.".dimmed()
        );
        all_ok = false;
    }
    println!();

    println!("{}", "Settings:".bold());
    match VoiceSettings::from_env() {
        Ok(settings) => {
            let validation = validate_settings(&settings);
            if validation.is_ok() {
                println!(
                    "  {} pitch {:+} st, formant {}, {} Hz, max {} s",
                    "ok".green(),
                    settings.pitch_semitones,
                    settings.formant_warp,
                    settings.target_sample_rate,
                    settings.max_duration_secs
                );
            } else {
                for error in &validation.errors {
                    println!("  {} {}", "!!".red(), error);
                }
                all_ok = false;
            }
        }
        Err(e) => {
            println!("  {} {}", "!!".red(), e);
            all_ok = false;
        }
    }
    println!();

    if all_ok {
        println!("{}", "All checks passed.".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{}", "Some checks failed.".red().bold());
        Ok(ExitCode::from(1))
    }
}
