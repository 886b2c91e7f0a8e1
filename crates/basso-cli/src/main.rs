//! Basso CLI - deepen recorded voice messages
//!
//! This binary lowers the pitch of a voice recording, warps its formants and
//! re-encodes it as an Opus voice message.

use clap::{Args, Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use basso_cli::commands;
use basso_cli::commands::settings::SettingsOverrides;
use basso_cli::VoiceRequest;

/// Basso - deep voice transformer
#[derive(Parser)]
#[command(name = "basso")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log pipeline progress to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Flags that override environment settings for one invocation.
#[derive(Args, Debug, Clone, Default)]
struct OverrideArgs {
    /// Pitch shift in semitones (negative is deeper)
    #[arg(long, allow_hyphen_values = true)]
    pitch: Option<f64>,

    /// Formant warp factor, 0.6 to 1.2 (output bin i reads source bin i * factor)
    #[arg(long)]
    formant: Option<f64>,

    /// Sample rate used for analysis
    #[arg(long)]
    sample_rate: Option<u32>,

    /// ffmpeg bass filter expression
    #[arg(long)]
    bass_filter: Option<String>,

    /// Opus output bitrate, e.g. 64k
    #[arg(long)]
    bitrate: Option<String>,

    /// Longest accepted input in seconds
    #[arg(long)]
    max_duration: Option<u32>,
}

impl From<OverrideArgs> for SettingsOverrides {
    fn from(args: OverrideArgs) -> Self {
        SettingsOverrides {
            pitch: args.pitch,
            formant: args.formant,
            sample_rate: args.sample_rate,
            bass_filter: args.bass_filter,
            bitrate: args.bitrate,
            max_duration: args.max_duration,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Deepen a voice recording and encode it as Opus
    Process {
        /// Input audio file (any format ffmpeg can decode)
        #[arg(short, long)]
        input: String,

        /// Output file
        #[arg(short, long)]
        output: String,

        /// Duration reported by the sender, checked before decoding
        #[arg(long)]
        declared_duration: Option<f64>,

        /// Path to the ffmpeg executable
        #[arg(long)]
        ffmpeg: Option<String>,

        #[command(flatten)]
        overrides: OverrideArgs,

        /// Output the processing report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective voice settings
    Settings {
        #[command(flatten)]
        overrides: OverrideArgs,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Check system dependencies and configuration
    Doctor {
        /// Path to the ffmpeg executable
        #[arg(long)]
        ffmpeg: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "basso_cli=debug,basso_backend_audio=debug,basso_backend_ffmpeg=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Process {
            input,
            output,
            declared_duration,
            ffmpeg,
            overrides,
            json,
        } => {
            let mut request = VoiceRequest::new(input, output);
            request.declared_duration_secs = declared_duration;
            commands::process::run(request, &overrides.into(), ffmpeg.as_deref(), json)
        }
        Commands::Settings { overrides, json } => commands::settings::run(&overrides.into(), json),
        Commands::Doctor { ffmpeg } => commands::doctor::run(ffmpeg.as_deref()),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_process() {
        let cli = Cli::try_parse_from([
            "basso",
            "process",
            "-i",
            "voice.ogg",
            "-o",
            "deep.ogg",
            "--pitch",
            "-4",
            "--formant",
            "0.8",
            "--declared-duration",
            "12.5",
        ])
        .unwrap();

        match cli.command {
            Commands::Process {
                input,
                output,
                declared_duration,
                overrides,
                json,
                ..
            } => {
                assert_eq!(input, "voice.ogg");
                assert_eq!(output, "deep.ogg");
                assert_eq!(declared_duration, Some(12.5));
                assert_eq!(overrides.pitch, Some(-4.0));
                assert_eq!(overrides.formant, Some(0.8));
                assert!(!json);
            }
            _ => panic!("expected process command"),
        }
    }

    #[test]
    fn test_cli_parses_settings_json() {
        let cli = Cli::try_parse_from(["basso", "settings", "--bitrate", "48k", "--json"]).unwrap();
        match cli.command {
            Commands::Settings { overrides, json } => {
                assert!(json);
                let overrides: SettingsOverrides = overrides.into();
                assert_eq!(overrides.bitrate.as_deref(), Some("48k"));
            }
            _ => panic!("expected settings command"),
        }
    }

    #[test]
    fn test_cli_requires_input_for_process() {
        assert!(Cli::try_parse_from(["basso", "process", "-o", "out.ogg"]).is_err());
    }
}
