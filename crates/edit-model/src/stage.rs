//! The fixed per-file stage sequence and tagged stage outcomes.

use std::fmt;

use clipsmith_common::error::{ClipsmithError, ErrorKind};
use serde::{Deserialize, Serialize};

/// One step of the per-file pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    FrameExport,
    SceneDetection,
    AudioAnalysis,
    AudioEnhancement,
    RuleGeneration,
    Render,
}

impl Stage {
    /// Every stage in execution order.
    pub const ALL: [Stage; 6] = [
        Stage::FrameExport,
        Stage::SceneDetection,
        Stage::AudioAnalysis,
        Stage::AudioEnhancement,
        Stage::RuleGeneration,
        Stage::Render,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::FrameExport => "frame_export",
            Stage::SceneDetection => "scene_detection",
            Stage::AudioAnalysis => "audio_analysis",
            Stage::AudioEnhancement => "audio_enhancement",
            Stage::RuleGeneration => "rule_generation",
            Stage::Render => "render",
        }
    }

    /// Kind assigned to failures that do not carry one of their own.
    pub fn default_kind(self) -> ErrorKind {
        match self {
            Stage::FrameExport => ErrorKind::DecodeError,
            Stage::SceneDetection | Stage::AudioAnalysis => ErrorKind::DetectionError,
            Stage::AudioEnhancement => ErrorKind::EnhancementError,
            Stage::RuleGeneration => ErrorKind::GenerationError,
            Stage::Render => ErrorKind::RenderError,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stage failure: which stage, which kind, and the original cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{stage} failed ({kind}): {cause}")]
pub struct StageFailure {
    pub stage: Stage,
    pub kind: ErrorKind,
    pub cause: String,
}

impl StageFailure {
    pub fn new(stage: Stage, kind: ErrorKind, cause: impl Into<String>) -> Self {
        Self {
            stage,
            kind,
            cause: cause.into(),
        }
    }

    /// Wrap a collaborator error, keeping its own kind when it has one.
    pub fn from_error(stage: Stage, error: &ClipsmithError) -> Self {
        Self {
            stage,
            kind: error.kind().unwrap_or_else(|| stage.default_kind()),
            cause: error.to_string(),
        }
    }
}

/// Outcome of a single stage: a payload, or a tagged failure.
pub type StageResult<T> = Result<T, StageFailure>;
