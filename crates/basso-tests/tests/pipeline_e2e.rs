//! End-to-end pipeline tests.
//!
//! These run the full decode -> analyze -> deepen -> synthesize -> encode
//! flow with in-process stand-ins for WORLD and ffmpeg, so they need no
//! external tools.

use std::process::ExitCode;

use basso_backend_ffmpeg::EncodeOptions;
use basso_cli::commands::process::{run, run_with, EXIT_TOO_LONG};
use basso_cli::commands::settings::{load_settings_from, SettingsOverrides};
use basso_cli::commands::FailureOutput;
use basso_cli::{PipelineError, VoicePipeline, VoiceRequest};
use basso_spec::{BackendError, ProcessReport, VoiceSettings};
use basso_tests::{zero_crossing_rate, SyntheticAnalyzer, TestHarness, WavTranscoder};
use pretty_assertions::assert_eq;

const RATE: u32 = 8000;

fn pipeline() -> VoicePipeline<SyntheticAnalyzer, WavTranscoder> {
    VoicePipeline::new(SyntheticAnalyzer::default(), WavTranscoder::default())
}

fn settings() -> VoiceSettings {
    VoiceSettings::default().with_sample_rate(RATE)
}

// ============================================================================
// Successful runs
// ============================================================================

#[test]
fn test_octave_down_halves_pitch() {
    let harness = TestHarness::new();
    let input = harness.write_tone("tone.wav", 220.0, 0.5, 1.0, RATE);
    let output = harness.file("deep.wav");
    let settings = settings().with_pitch(-12.0).unwrap();

    let pipeline = pipeline();
    let report = pipeline
        .process(&VoiceRequest::new(&input, &output), &settings)
        .unwrap();

    let source = harness.read_wav(&input);
    let result = harness.read_wav(&output);
    let in_rate = zero_crossing_rate(&source.samples, RATE);
    let out_rate = zero_crossing_rate(&result.samples, RATE);
    assert!(
        (out_rate - in_rate / 2.0).abs() < 3.0,
        "expected about {} Hz, got {} Hz",
        in_rate / 2.0,
        out_rate
    );

    let peak = result.samples.iter().map(|s| s.abs()).fold(0.0, f64::max);
    assert!((peak - 0.99).abs() < 1e-4, "peak {peak}");

    assert_eq!(report.input_duration_secs, 1.0);
    assert_eq!(report.frame_count, 200);
    assert_eq!(report.bin_count, 65);
    assert_eq!(report.voiced_ratio, 1.0);
}

#[test]
fn test_report_lists_stages_and_serializes() {
    let harness = TestHarness::new();
    let input = harness.write_tone("tone.wav", 180.0, 0.3, 0.25, RATE);
    let output = harness.file("deep.wav");

    let report = pipeline()
        .process(&VoiceRequest::new(&input, &output), &settings())
        .unwrap();

    let stages: Vec<&str> = report.stages.iter().map(|s| s.stage.as_str()).collect();
    assert_eq!(stages, vec!["decode", "deepen", "encode"]);
    assert_eq!(report.input, input);
    assert_eq!(report.output, output);
    assert_eq!(report.settings, settings());

    let parsed = ProcessReport::from_json(&report.to_json().unwrap()).unwrap();
    assert_eq!(parsed, report);
}

#[test]
fn test_encode_receives_filter_chain_and_bitrate() {
    let harness = TestHarness::new();
    let input = harness.write_tone("tone.wav", 200.0, 0.4, 0.2, RATE);
    let settings = settings().with_bass_filter("bass=g=4").with_bitrate("32k");

    let pipeline = pipeline();
    pipeline
        .process(
            &VoiceRequest::new(&input, harness.file("deep.wav")),
            &settings,
        )
        .unwrap();

    assert_eq!(pipeline.transcoder().decoded(), vec![RATE]);
    assert_eq!(
        pipeline.transcoder().encoded(),
        vec![EncodeOptions {
            filter_chain: "bass=g=4,lowpass=f=8000".to_string(),
            codec: "libopus".to_string(),
            bitrate: "32k".to_string(),
        }]
    );
}

#[test]
fn test_silence_stays_silent() {
    let harness = TestHarness::new();
    let input = harness.write_wav("silence.wav", &vec![0.0; 4000], RATE);
    let output = harness.file("deep.wav");

    let report = pipeline()
        .process(&VoiceRequest::new(&input, &output), &settings())
        .unwrap();

    assert_eq!(report.voiced_ratio, 0.0);
    let result = harness.read_wav(&output);
    assert!(result.samples.iter().all(|&s| s == 0.0));
}

#[test]
fn test_unvoiced_tail_is_preserved() {
    let harness = TestHarness::new();
    let mut samples = basso_tests::sine_wave(150.0, 0.5, 0.5, RATE);
    samples.extend(std::iter::repeat(0.0).take(4000));
    let input = harness.write_wav("half.wav", &samples, RATE);
    let output = harness.file("deep.wav");

    let report = pipeline()
        .process(&VoiceRequest::new(&input, &output), &settings())
        .unwrap();

    assert_eq!(report.voiced_ratio, 0.5);
    let result = harness.read_wav(&output);
    assert!(result.samples[..4000].iter().any(|&s| s != 0.0));
    assert!(result.samples[4000..].iter().all(|&s| s == 0.0));
}

#[test]
fn test_output_directory_is_created() {
    let harness = TestHarness::new();
    let input = harness.write_tone("tone.wav", 200.0, 0.4, 0.1, RATE);
    let output = harness.file("nested/dir/deep.wav");

    pipeline()
        .process(&VoiceRequest::new(&input, &output), &settings())
        .unwrap();

    assert!(output.exists());
}

// ============================================================================
// Rejections
// ============================================================================

#[test]
fn test_declared_duration_over_limit_skips_decoding() {
    let harness = TestHarness::new();
    let request = VoiceRequest::new(harness.file("big.ogg"), harness.file("out.ogg"))
        .declared_duration(46.0);

    let pipeline = pipeline();
    let err = pipeline.process(&request, &settings()).unwrap_err();

    match err {
        PipelineError::TooLong {
            duration_secs,
            max_secs,
        } => {
            assert_eq!(duration_secs, 46.0);
            assert_eq!(max_secs, 45);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(pipeline.transcoder().decoded().is_empty());
}

#[test]
fn test_declared_duration_at_limit_is_accepted() {
    let harness = TestHarness::new();
    let input = harness.write_tone("tone.wav", 200.0, 0.4, 0.1, RATE);
    let request = VoiceRequest::new(&input, harness.file("out.wav")).declared_duration(45.0);

    assert!(pipeline().process(&request, &settings()).is_ok());
}

#[test]
fn test_measured_duration_over_limit() {
    let harness = TestHarness::new();
    let input = harness.write_tone("long.wav", 200.0, 0.4, 3.0, RATE);
    let output = harness.file("out.wav");
    let settings = settings().with_max_duration(2);

    let pipeline = pipeline();
    let err = pipeline
        .process(&VoiceRequest::new(&input, &output), &settings)
        .unwrap_err();

    assert!(matches!(err, PipelineError::TooLong { max_secs: 2, .. }));
    assert_eq!(pipeline.transcoder().decoded().len(), 1);
    assert!(pipeline.transcoder().encoded().is_empty());
    assert!(!output.exists());
}

#[test]
fn test_missing_input_reports_transcode_error() {
    let harness = TestHarness::new();
    let err = pipeline()
        .process(
            &VoiceRequest::new(harness.file("nope.wav"), harness.file("out.wav")),
            &settings(),
        )
        .unwrap_err();

    assert_eq!(err.code(), "FFMPEG_005");
    assert_eq!(err.category(), "ffmpeg");
}

#[test]
fn test_invalid_settings_are_all_reported() {
    let harness = TestHarness::new();
    let mut settings = settings();
    settings.pitch_semitones = f64::NAN;
    settings.bass_filter = String::new();
    settings.max_duration_secs = 0;

    let err = pipeline()
        .process(
            &VoiceRequest::new(harness.file("a.wav"), harness.file("b.wav")),
            &settings,
        )
        .unwrap_err();

    match err {
        PipelineError::InvalidSettings(errors) => {
            let codes: Vec<&str> = errors.iter().map(|e| e.code.code()).collect();
            assert_eq!(codes, vec!["S001", "S004", "S006"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ============================================================================
// Command layer
// ============================================================================

#[test]
fn test_process_command_exit_codes() {
    let harness = TestHarness::new();
    let input = harness.write_tone("tone.wav", 200.0, 0.4, 0.1, RATE);
    let pipeline = pipeline();

    let ok = run_with(
        &pipeline,
        &VoiceRequest::new(&input, harness.file("out.wav")),
        &settings(),
        true,
    )
    .unwrap();
    assert_eq!(ok, ExitCode::SUCCESS);

    let too_long = run_with(
        &pipeline,
        &VoiceRequest::new(&input, harness.file("out2.wav")).declared_duration(600.0),
        &settings(),
        true,
    )
    .unwrap();
    assert_eq!(too_long, ExitCode::from(EXIT_TOO_LONG));
}

#[test]
fn test_process_command_propagates_failures_in_human_mode() {
    let harness = TestHarness::new();
    let result = run_with(
        &pipeline(),
        &VoiceRequest::new(harness.file("missing.wav"), harness.file("out.wav")),
        &settings(),
        false,
    );

    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("Input file not found"));
}

// ============================================================================
// JSON failures
// ============================================================================

fn failure_json(err: &PipelineError) -> serde_json::Value {
    let json = FailureOutput::from_error(err).to_json_pretty().unwrap();
    serde_json::from_str(&json).unwrap()
}

#[test]
fn test_failure_json_shape() {
    let value = failure_json(&PipelineError::TooLong {
        duration_secs: 50.0,
        max_secs: 45,
    });
    let object = value.as_object().unwrap();
    let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["category", "code", "message", "ok"]);
    assert_eq!(value["ok"], false);
    assert_eq!(value["code"], "PIPELINE_002");
    assert_eq!(value["category"], "pipeline");
    assert!(value["message"].as_str().unwrap().contains("too long"));
}

#[test]
fn test_failure_json_for_missing_vocoder() {
    let value = failure_json(&PipelineError::AnalyzerUnavailable);
    assert_eq!(value["code"], "PIPELINE_004");
    assert_eq!(value["category"], "pipeline");
    assert!(value["message"]
        .as_str()
        .unwrap()
        .contains("--features world"));
}

#[test]
fn test_failure_json_for_bad_environment() {
    let err = load_settings_from(&SettingsOverrides::default(), |name| {
        (name == "FORMANT_WARP").then(|| "abc".to_string())
    })
    .unwrap_err();
    let value = failure_json(&PipelineError::from(err));
    assert_eq!(value["ok"], false);
    assert_eq!(value["code"], "SETTINGS_001");
    assert_eq!(value["category"], "settings");
    assert!(value["message"].as_str().unwrap().contains("FORMANT_WARP"));
}

#[test]
fn test_failure_json_for_rejected_flag() {
    let err = SettingsOverrides {
        formant: Some(1.5),
        ..Default::default()
    }
    .apply(VoiceSettings::default())
    .unwrap_err();
    let value = failure_json(&PipelineError::from(err));
    assert_eq!(value["code"], "SETTINGS_003");
}

#[test]
fn test_process_command_json_settings_failure_exits_one() {
    let harness = TestHarness::new();
    let overrides = SettingsOverrides {
        formant: Some(5.0),
        ..Default::default()
    };
    let request = VoiceRequest::new(harness.file("in.ogg"), harness.file("out.ogg"));

    let code = run(request.clone(), &overrides, None, true).unwrap();
    assert_eq!(code, ExitCode::from(1));

    let err = run(request, &overrides, None, false).unwrap_err();
    assert!(format!("{err:#}").contains("formant warp 5"));
}

#[cfg(not(feature = "world"))]
#[test]
fn test_process_command_without_vocoder() {
    let harness = TestHarness::new();
    let request = VoiceRequest::new(harness.file("nope.ogg"), harness.file("out.ogg"));

    let code = run(request.clone(), &SettingsOverrides::default(), None, true).unwrap();
    assert_eq!(code, ExitCode::from(1));

    let err = run(request, &SettingsOverrides::default(), None, false).unwrap_err();
    assert!(format!("{err:#}").contains("WORLD vocoder"));
}
