//! ffmpeg subprocess orchestrator.
//!
//! This module locates an ffmpeg executable, builds the decode and encode
//! command lines and runs them with a timeout, surfacing ffmpeg's stderr
//! when it fails.

use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::error::{TranscodeError, TranscodeResult};
use crate::transcoder::{EncodeOptions, Transcoder};

/// Default timeout for a single ffmpeg invocation (2 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment variable overriding the ffmpeg executable.
pub const FFMPEG_PATH_ENV: &str = "FFMPEG_PATH";

/// Configuration for the ffmpeg transcoder.
#[derive(Debug, Clone)]
pub struct FfmpegConfig {
    /// Path to the ffmpeg executable.
    pub ffmpeg_path: Option<PathBuf>,
    /// Timeout for each ffmpeg run.
    pub timeout: Duration,
    /// Whether to capture ffmpeg's stderr for error reports.
    pub capture_output: bool,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            capture_output: true,
        }
    }
}

impl FfmpegConfig {
    /// Sets the ffmpeg executable path.
    pub fn ffmpeg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffmpeg_path = Some(path.into());
        self
    }

    /// Sets the timeout duration.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

/// Transcoder backed by an ffmpeg subprocess.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    config: FfmpegConfig,
}

impl FfmpegTranscoder {
    /// Creates a transcoder with default configuration.
    pub fn new() -> Self {
        Self {
            config: FfmpegConfig::default(),
        }
    }

    /// Creates a transcoder with the given configuration.
    pub fn with_config(config: FfmpegConfig) -> Self {
        Self { config }
    }

    /// Finds the ffmpeg executable path.
    pub fn find_ffmpeg(&self) -> TranscodeResult<PathBuf> {
        // A configured path is final; the environment is only searched without one
        if let Some(ref path) = self.config.ffmpeg_path {
            if path.exists() {
                return Ok(path.clone());
            }
            tracing::warn!(path = %path.display(), "configured ffmpeg does not exist");
            return Err(TranscodeError::FfmpegNotFound);
        }

        if let Ok(path) = std::env::var(FFMPEG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(path);
            }
        }

        let names = if cfg!(windows) {
            vec!["ffmpeg.exe", "ffmpeg"]
        } else {
            vec!["ffmpeg"]
        };
        for name in names {
            if let Ok(path) = which::which(name) {
                return Ok(path);
            }
        }

        let common_paths = if cfg!(windows) {
            vec!["C:\\ffmpeg\\bin\\ffmpeg.exe", "C:\\Program Files\\ffmpeg\\bin\\ffmpeg.exe"]
        } else if cfg!(target_os = "macos") {
            vec!["/opt/homebrew/bin/ffmpeg", "/usr/local/bin/ffmpeg"]
        } else {
            vec!["/usr/bin/ffmpeg", "/usr/local/bin/ffmpeg", "/snap/bin/ffmpeg"]
        };
        for path_str in common_paths {
            let path = PathBuf::from(path_str);
            if path.exists() {
                return Ok(path);
            }
        }

        Err(TranscodeError::FfmpegNotFound)
    }

    /// Returns the first line of `ffmpeg -version`.
    pub fn version(&self) -> TranscodeResult<String> {
        let ffmpeg = self.find_ffmpeg()?;
        let output = Command::new(&ffmpeg)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .map_err(TranscodeError::SpawnFailed)?;
        if !output.status.success() {
            return Err(TranscodeError::process_failed(
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    /// Runs ffmpeg with the given arguments and checks that `output` exists.
    fn run(&self, args: Vec<OsString>, output: &Path) -> TranscodeResult<()> {
        let ffmpeg = self.find_ffmpeg()?;
        tracing::debug!(ffmpeg = %ffmpeg.display(), ?args, "running ffmpeg");

        let mut cmd = Command::new(&ffmpeg);
        cmd.args(&args).stdin(Stdio::null());
        if self.config.capture_output {
            // stderr stays small with -loglevel error, so reading it after
            // exit cannot fill the pipe.
            cmd.stdout(Stdio::null()).stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let child = cmd.spawn().map_err(TranscodeError::SpawnFailed)?;
        let (status, stderr) =
            wait_with_timeout(child, self.config.timeout, self.config.capture_output)?;

        if !status.success() {
            let exit_code = status.code().unwrap_or(-1);
            tracing::warn!(exit_code, stderr = %stderr.trim(), "ffmpeg failed");
            return Err(TranscodeError::process_failed(exit_code, stderr.trim()));
        }

        if !output.exists() {
            return Err(TranscodeError::OutputNotFound {
                path: output.to_path_buf(),
            });
        }
        Ok(())
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcoder for FfmpegTranscoder {
    fn decode(&self, input: &Path, output_wav: &Path, sample_rate: u32) -> TranscodeResult<()> {
        if !input.exists() {
            return Err(TranscodeError::InputNotFound {
                path: input.to_path_buf(),
            });
        }
        if sample_rate == 0 {
            return Err(TranscodeError::invalid_option(
                "sample_rate",
                "must be positive",
            ));
        }
        self.run(decode_args(input, output_wav, sample_rate), output_wav)
    }

    fn encode(
        &self,
        input_wav: &Path,
        output: &Path,
        options: &EncodeOptions,
    ) -> TranscodeResult<()> {
        if !input_wav.exists() {
            return Err(TranscodeError::InputNotFound {
                path: input_wav.to_path_buf(),
            });
        }
        options.validate()?;
        self.run(encode_args(input_wav, output, options), output)
    }
}

fn common_args() -> Vec<OsString> {
    ["-hide_banner", "-nostdin", "-loglevel", "error", "-y"]
        .iter()
        .map(OsString::from)
        .collect()
}

/// Arguments converting `input` to mono WAV at `sample_rate`:
/// `-i <input> -ar <rate> -ac 1 <output>`.
pub fn decode_args(input: &Path, output_wav: &Path, sample_rate: u32) -> Vec<OsString> {
    let mut args = common_args();
    args.push("-i".into());
    args.push(input.as_os_str().to_owned());
    args.push("-ar".into());
    args.push(sample_rate.to_string().into());
    args.push("-ac".into());
    args.push("1".into());
    args.push(output_wav.as_os_str().to_owned());
    args
}

/// Arguments filtering and encoding a WAV:
/// `-i <input> -af <filters> -c:a <codec> -b:a <bitrate> <output>`.
pub fn encode_args(input_wav: &Path, output: &Path, options: &EncodeOptions) -> Vec<OsString> {
    let mut args = common_args();
    args.push("-i".into());
    args.push(input_wav.as_os_str().to_owned());
    if !options.filter_chain.trim().is_empty() {
        args.push("-af".into());
        args.push(options.filter_chain.clone().into());
    }
    args.push("-c:a".into());
    args.push(options.codec.clone().into());
    args.push("-b:a".into());
    args.push(options.bitrate.clone().into());
    args.push(output.as_os_str().to_owned());
    args
}

fn wait_with_timeout(
    mut child: Child,
    timeout: Duration,
    capture_output: bool,
) -> TranscodeResult<(ExitStatus, String)> {
    let start = Instant::now();

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(TranscodeError::Timeout {
                        timeout_secs: timeout.as_secs(),
                    });
                }
                std::thread::sleep(Duration::from_millis(20));
            }
            Err(e) => return Err(TranscodeError::SpawnFailed(e)),
        }
    };

    let stderr = if capture_output {
        let mut buf = String::new();
        if let Some(mut err) = child.stderr.take() {
            let _ = err.read_to_string(&mut buf);
        }
        buf
    } else {
        String::new()
    };

    Ok((status, stderr))
}
