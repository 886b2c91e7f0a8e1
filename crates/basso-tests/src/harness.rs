//! Test harness for pipeline runs.

use std::path::{Path, PathBuf};

use basso_backend_audio::{read_wav_mono, write_wav_f32, MonoAudio};
use tempfile::TempDir;

use crate::fixtures::sine_wave;

/// Environment variable that opts in to tests needing a real ffmpeg.
pub const RUN_FFMPEG_TESTS_ENV: &str = "BASSO_RUN_FFMPEG_TESTS";

/// Returns true when ffmpeg-backed tests were requested.
pub fn should_run_ffmpeg_tests() -> bool {
    std::env::var(RUN_FFMPEG_TESTS_ENV).is_ok()
}

/// Scratch directory plus helpers for writing inputs and reading outputs.
pub struct TestHarness {
    /// Working directory for test inputs and outputs.
    pub work_dir: TempDir,
}

impl TestHarness {
    /// Create a new test harness.
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().expect("Failed to create work dir"),
        }
    }

    /// Get the working directory path.
    pub fn path(&self) -> &Path {
        self.work_dir.path()
    }

    /// Path of `name` inside the working directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.path().join(name)
    }

    /// Writes a mono float WAV and returns its path.
    pub fn write_wav(&self, name: &str, samples: &[f64], sample_rate: u32) -> PathBuf {
        let path = self.file(name);
        write_wav_f32(&path, samples, sample_rate).expect("Failed to write test WAV");
        path
    }

    /// Writes a sine tone and returns its path.
    pub fn write_tone(
        &self,
        name: &str,
        freq_hz: f64,
        amplitude: f64,
        secs: f64,
        sample_rate: u32,
    ) -> PathBuf {
        let samples = sine_wave(freq_hz, amplitude, secs, sample_rate);
        self.write_wav(name, &samples, sample_rate)
    }

    /// Reads a WAV written by the pipeline.
    pub fn read_wav(&self, path: &Path) -> MonoAudio {
        read_wav_mono(path).expect("Failed to read WAV")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
