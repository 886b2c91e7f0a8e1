//! Basso End-to-End Test Infrastructure
//!
//! This crate provides integration tests for the voice pipeline:
//!
//! - **Pipeline**: input WAV -> deepened output, with in-process fakes for
//!   the vocoder and the transcoder
//! - **Formant warp**: envelope warping properties through the public API
//! - **ffmpeg**: real decode/encode round trips (opt-in)
//!
//! ## Running Tests
//!
//! ```bash
//! # Run the self-contained tests
//! cargo test -p basso-tests
//!
//! # Run the ffmpeg tests (requires ffmpeg with libopus)
//! BASSO_RUN_FFMPEG_TESTS=1 cargo test -p basso-tests -- --ignored
//!
//! # Include the WORLD vocoder
//! BASSO_RUN_FFMPEG_TESTS=1 cargo test -p basso-tests --features world -- --ignored
//! ```

pub mod fixtures;
pub mod harness;

pub use fixtures::{
    gaussian_envelope, peak_bin, sine_wave, zero_crossing_rate, SyntheticAnalyzer, WavTranscoder,
};
pub use harness::{should_run_ffmpeg_tests, TestHarness};
