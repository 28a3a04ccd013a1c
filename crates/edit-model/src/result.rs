//! Per-file processing results and the batch-level report.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clipsmith_common::error::ClipsmithResult;
use serde::{Deserialize, Serialize};

use crate::edit::EditOperation;
use crate::input::{ArtifactPaths, InputVideo};
use crate::stage::StageFailure;

/// What the analysis stages found, kept alongside a successful result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub scene_count: usize,
    pub tempo_bpm: f64,
    pub beat_count: usize,
    pub operations: Vec<EditOperation>,
}

/// Terminal outcome of one file's pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success {
        artifacts: ArtifactPaths,
        summary: AnalysisSummary,
    },
    Failed {
        failure: StageFailure,
        /// Rule text sidecar, when rule generation finished before the failure.
        saved_rules: Option<PathBuf>,
    },
}

/// One record per input video. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub input: InputVideo,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub elapsed_secs: f64,
}

impl ProcessingResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    pub fn failure(&self) -> Option<&StageFailure> {
        match &self.outcome {
            Outcome::Failed { failure, .. } => Some(failure),
            Outcome::Success { .. } => None,
        }
    }

    pub fn artifacts(&self) -> Option<&ArtifactPaths> {
        match &self.outcome {
            Outcome::Success { artifacts, .. } => Some(artifacts),
            Outcome::Failed { .. } => None,
        }
    }
}

/// Batch-level report written after every discovered file was attempted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub prompt: String,
    pub batch_size: usize,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<ProcessingResult>,
}

impl BatchReport {
    /// File name of the report inside the output directory.
    pub const FILE_NAME: &'static str = "batch_report.json";

    pub fn new(
        started_at: DateTime<Utc>,
        input_dir: &Path,
        output_dir: &Path,
        prompt: &str,
        batch_size: usize,
        results: Vec<ProcessingResult>,
    ) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        Self {
            started_at,
            finished_at: Utc::now(),
            input_dir: input_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            prompt: prompt.to_string(),
            batch_size,
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }

    /// Write the report as pretty JSON and return its path.
    pub fn save(&self, output_dir: &Path) -> ClipsmithResult<PathBuf> {
        let path = output_dir.join(Self::FILE_NAME);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Stage;
    use clipsmith_common::error::ErrorKind;

    fn failed(name: &str) -> ProcessingResult {
        ProcessingResult {
            input: InputVideo::from_path(format!("/in/{name}")).unwrap(),
            outcome: Outcome::Failed {
                failure: StageFailure::new(Stage::Render, ErrorKind::RenderError, "boom"),
                saved_rules: Some(PathBuf::from(format!("/out/rules_{name}.txt"))),
            },
            elapsed_secs: 0.5,
        }
    }

    fn succeeded(name: &str) -> ProcessingResult {
        let input = InputVideo::from_path(format!("/in/{name}")).unwrap();
        ProcessingResult {
            outcome: Outcome::Success {
                artifacts: input.artifacts(Path::new("/out")),
                summary: AnalysisSummary {
                    scene_count: 3,
                    tempo_bpm: 120.0,
                    beat_count: 8,
                    operations: vec![EditOperation::SlowMotion { factor: 0.5 }],
                },
            },
            input,
            elapsed_secs: 1.0,
        }
    }

    #[test]
    fn test_result_serializes_status_tag() {
        let json = serde_json::to_value(failed("a.mp4")).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["failure"]["stage"], "render");
        assert_eq!(json["failure"]["kind"], "RenderError");

        let json = serde_json::to_value(succeeded("b.mp4")).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["summary"]["scene_count"], 3);
    }

    #[test]
    fn test_report_counts_and_save() {
        let dir = std::env::temp_dir().join("clipsmith_test_report");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let report = BatchReport::new(
            Utc::now(),
            Path::new("/in"),
            &dir,
            "asmr",
            1,
            vec![succeeded("a.mp4"), failed("b.mp4"), succeeded("c.webm")],
        );
        assert_eq!(report.total, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);

        let path = report.save(&dir).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["results"].as_array().unwrap().len(), 3);

        std::fs::remove_dir_all(&dir).ok();
    }
}
