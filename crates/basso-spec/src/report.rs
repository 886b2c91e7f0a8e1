//! Report types for processed voice messages.
//!
//! A report documents one run of the voice pipeline: which settings were
//! used, how long the audio was, how large the analysis was and how long
//! each stage took.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::settings::VoiceSettings;

/// Report schema version.
pub const REPORT_VERSION: u32 = 1;

/// Timing of a single pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTiming {
    /// Name of the stage (e.g., "decode", "analyze", "encode").
    pub stage: String,
    /// Duration of this stage in milliseconds.
    pub duration_ms: u64,
}

impl StageTiming {
    /// Creates a new stage timing entry.
    ///
    /// # Example
    /// ```
    /// use basso_spec::report::StageTiming;
    ///
    /// let timing = StageTiming::new("analyze", 42);
    /// assert_eq!(timing.stage, "analyze");
    /// assert_eq!(timing.duration_ms, 42);
    /// ```
    pub fn new(stage: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            stage: stage.into(),
            duration_ms,
        }
    }
}

/// Summary of one processed voice message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessReport {
    /// Report schema version.
    pub report_version: u32,
    /// Source audio file.
    pub input: PathBuf,
    /// Encoded result.
    pub output: PathBuf,
    /// Settings the request was processed with.
    pub settings: VoiceSettings,
    /// Duration of the decoded input in seconds.
    pub input_duration_secs: f64,
    /// Number of analysis frames.
    pub frame_count: usize,
    /// Number of spectral bins per frame.
    pub bin_count: usize,
    /// Fraction of frames with a detected F0.
    pub voiced_ratio: f64,
    /// Per-stage timings.
    pub stages: Vec<StageTiming>,
    /// Total wall time in milliseconds.
    pub duration_ms: u64,
}

impl ProcessReport {
    /// Starts a report for the given request.
    pub fn new(input: PathBuf, output: PathBuf, settings: VoiceSettings) -> Self {
        Self {
            report_version: REPORT_VERSION,
            input,
            output,
            settings,
            input_duration_secs: 0.0,
            frame_count: 0,
            bin_count: 0,
            voiced_ratio: 0.0,
            stages: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Records a stage timing.
    pub fn push_stage(&mut self, stage: impl Into<String>, duration_ms: u64) {
        self.stages.push(StageTiming::new(stage, duration_ms));
    }

    /// Looks up the timing of a stage by name.
    pub fn stage(&self, name: &str) -> Option<&StageTiming> {
        self.stages.iter().find(|s| s.stage == name)
    }

    /// Serializes the report to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the report to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parses a report from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_report_stages() {
        let mut report = ProcessReport::new(
            PathBuf::from("in.ogg"),
            PathBuf::from("out.ogg"),
            VoiceSettings::default(),
        );
        report.push_stage("decode", 12);
        report.push_stage("analyze", 340);

        assert_eq!(report.stage("analyze").map(|s| s.duration_ms), Some(340));
        assert!(report.stage("encode").is_none());
    }

    #[test]
    fn test_report_json_roundtrip() {
        let mut report = ProcessReport::new(
            PathBuf::from("voice.ogg"),
            PathBuf::from("deep.ogg"),
            VoiceSettings::default(),
        );
        report.input_duration_secs = 3.5;
        report.frame_count = 700;
        report.bin_count = 513;
        report.voiced_ratio = 0.6;
        report.push_stage("encode", 5);
        report.duration_ms = 1200;

        let json = report.to_json_pretty().unwrap();
        assert!(json.contains("\"report_version\": 1"));
        let parsed = ProcessReport::from_json(&json).unwrap();
        assert_eq!(parsed, report);
    }
}
