//! Voice pipeline
//!
//! Glues the transcoder, the vocoder and the formant warp together for one
//! request: decode, analyze, deepen, resynthesize, encode.

use std::path::{Path, PathBuf};
use std::time::Instant;

use basso_backend_audio::{
    deepen, normalize_peak, read_wav_mono, write_wav_f32, AudioError, PitchAnalyzer, WarpFactor,
    WorldFeatures,
};
use basso_backend_ffmpeg::{EncodeOptions, TranscodeError, Transcoder};
use basso_spec::{
    duration_within_limit, validate_settings, BackendError, ProcessReport, SettingsError,
    ValidationError, VoiceSettings,
};
use thiserror::Error;

/// One voice message to process.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceRequest {
    /// Source audio in any format the transcoder understands.
    pub input: PathBuf,
    /// Where the encoded result is written.
    pub output: PathBuf,
    /// Duration reported by the sender, checked before any work is done.
    pub declared_duration_secs: Option<f64>,
}

impl VoiceRequest {
    /// Creates a request without a declared duration.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            declared_duration_secs: None,
        }
    }

    /// Sets the duration reported by the sender.
    pub fn declared_duration(mut self, secs: f64) -> Self {
        self.declared_duration_secs = Some(secs);
        self
    }
}

/// Errors that can occur while processing a voice message.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Settings failed validation.
    #[error("invalid settings: {}", join_errors(.0))]
    InvalidSettings(Vec<ValidationError>),

    /// Settings could not be built from the environment or flags.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// No vocoder is linked into this build.
    #[error("basso was built without the WORLD vocoder; rebuild with `--features world` to process audio")]
    AnalyzerUnavailable,

    /// Input is longer than the configured limit.
    #[error("voice message is too long ({duration_secs:.1}s); the limit is {max_secs}s")]
    TooLong { duration_secs: f64, max_secs: u32 },

    /// Vocoder or warp failure.
    #[error(transparent)]
    Audio(#[from] AudioError),

    /// Transcoder failure.
    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    /// IO error while managing scratch files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl BackendError for PipelineError {
    fn code(&self) -> &'static str {
        match self {
            PipelineError::InvalidSettings(_) => "PIPELINE_001",
            PipelineError::TooLong { .. } => "PIPELINE_002",
            PipelineError::AnalyzerUnavailable => "PIPELINE_004",
            PipelineError::Settings(e) => e.code(),
            PipelineError::Audio(e) => e.code(),
            PipelineError::Transcode(e) => e.code(),
            PipelineError::Io(_) => "PIPELINE_003",
        }
    }

    fn category(&self) -> &'static str {
        match self {
            PipelineError::Settings(e) => e.category(),
            PipelineError::Audio(e) => e.category(),
            PipelineError::Transcode(e) => e.category(),
            _ => "pipeline",
        }
    }
}

/// Deepened waveform plus the analysis it came from.
#[derive(Debug, Clone)]
pub struct DeepenedAudio {
    /// Peak-normalized output samples.
    pub samples: Vec<f64>,
    /// Features of the input before modification.
    pub features: WorldFeatures,
}

/// Analyzes `samples`, shifts pitch, warps formants and resynthesizes.
pub fn deepen_samples<A: PitchAnalyzer>(
    analyzer: &A,
    samples: &[f64],
    sample_rate: u32,
    settings: &VoiceSettings,
) -> Result<DeepenedAudio, AudioError> {
    let formant = WarpFactor::new(settings.formant_warp)?;
    let features = analyzer.analyze(samples, sample_rate)?;
    let deep = deepen(&features, settings.pitch_semitones, formant)?;
    let mut out = analyzer.synthesize(&deep, sample_rate)?;
    normalize_peak(&mut out);
    Ok(DeepenedAudio {
        samples: out,
        features,
    })
}

/// Processes voice messages with a fixed analyzer and transcoder.
pub struct VoicePipeline<A, T> {
    analyzer: A,
    transcoder: T,
}

impl<A: PitchAnalyzer, T: Transcoder> VoicePipeline<A, T> {
    /// Creates a pipeline.
    pub fn new(analyzer: A, transcoder: T) -> Self {
        Self {
            analyzer,
            transcoder,
        }
    }

    /// The analyzer in use.
    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    /// The transcoder in use.
    pub fn transcoder(&self) -> &T {
        &self.transcoder
    }

    /// Processes one request with the given settings.
    ///
    /// Scratch files live in a temporary directory removed on return.
    pub fn process(
        &self,
        request: &VoiceRequest,
        settings: &VoiceSettings,
    ) -> Result<ProcessReport, PipelineError> {
        let start = Instant::now();
        validate_settings(settings)
            .into_result()
            .map_err(PipelineError::InvalidSettings)?;

        if let Some(declared) = request.declared_duration_secs {
            check_duration(declared, settings)?;
        }

        let mut report = ProcessReport::new(
            request.input.clone(),
            request.output.clone(),
            settings.clone(),
        );

        let scratch = tempfile::Builder::new().prefix("basso_").tempdir()?;
        let input_wav = scratch.path().join("input.wav");
        let processed_wav = scratch.path().join("processed.wav");

        tracing::info!(input = %request.input.display(), "processing voice message");

        let stage = Instant::now();
        self.transcoder
            .decode(&request.input, &input_wav, settings.target_sample_rate)?;
        let audio = read_wav_mono(&input_wav)?;
        report.push_stage("decode", elapsed_ms(stage));

        report.input_duration_secs = audio.duration_secs();
        check_duration(report.input_duration_secs, settings)?;

        let stage = Instant::now();
        let deepened =
            deepen_samples(&self.analyzer, &audio.samples, audio.sample_rate, settings)?;
        report.push_stage("deepen", elapsed_ms(stage));
        report.frame_count = deepened.features.frames();
        report.bin_count = deepened.features.spectral_envelope.bins();
        report.voiced_ratio = deepened.features.voiced_ratio();
        tracing::debug!(
            frames = report.frame_count,
            bins = report.bin_count,
            voiced_ratio = report.voiced_ratio,
            "resynthesized"
        );

        let stage = Instant::now();
        write_wav_f32(&processed_wav, &deepened.samples, audio.sample_rate)?;
        ensure_parent_dir(&request.output)?;
        self.transcoder.encode(
            &processed_wav,
            &request.output,
            &EncodeOptions::from_settings(settings),
        )?;
        report.push_stage("encode", elapsed_ms(stage));

        report.duration_ms = elapsed_ms(start);
        tracing::info!(
            output = %request.output.display(),
            duration_ms = report.duration_ms,
            "voice message processed"
        );
        Ok(report)
    }
}

fn check_duration(duration_secs: f64, settings: &VoiceSettings) -> Result<(), PipelineError> {
    if duration_within_limit(duration_secs, settings) {
        Ok(())
    } else {
        Err(PipelineError::TooLong {
            duration_secs,
            max_secs: settings.max_duration_secs,
        })
    }
}

fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}
