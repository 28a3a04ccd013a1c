//! Per-file pipeline state machine.
//!
//! ```text
//! Exporting -> SceneDetecting -> AudioAnalyzing -> AudioEnhancing
//!     -> RuleGenerating -> Rendering -> Done
//!          (any stage error) ---------------> Failed
//! ```
//!
//! Every run ends in `Done` or `Failed` and produces exactly one
//! [`ProcessingResult`]. A failed stage stops the file; later stages never
//! run.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clipsmith_common::config::PipelineConfig;
use clipsmith_common::error::{ClipsmithError, ErrorKind};
use clipsmith_edit_model::analysis::{AudioAnalysis, SceneSpan};
use clipsmith_edit_model::edit::EditOperation;
use clipsmith_edit_model::input::{ArtifactPaths, InputVideo};
use clipsmith_edit_model::result::{AnalysisSummary, Outcome, ProcessingResult};
use clipsmith_edit_model::stage::{Stage, StageFailure, StageResult};
use tokio::sync::{watch, Semaphore};

use crate::adapters::StageAdapters;
use crate::stage::invoke;

/// Position of a file in the stage sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Exporting,
    SceneDetecting,
    AudioAnalyzing,
    AudioEnhancing,
    RuleGenerating,
    Rendering,
    Done,
    Failed,
}

impl PipelineState {
    /// The stage executed in this state; `None` for terminal states.
    pub fn stage(self) -> Option<Stage> {
        match self {
            PipelineState::Exporting => Some(Stage::FrameExport),
            PipelineState::SceneDetecting => Some(Stage::SceneDetection),
            PipelineState::AudioAnalyzing => Some(Stage::AudioAnalysis),
            PipelineState::AudioEnhancing => Some(Stage::AudioEnhancement),
            PipelineState::RuleGenerating => Some(Stage::RuleGeneration),
            PipelineState::Rendering => Some(Stage::Render),
            PipelineState::Done | PipelineState::Failed => None,
        }
    }

    /// Successor after this state's stage succeeds.
    pub fn next(self) -> PipelineState {
        match self {
            PipelineState::Exporting => PipelineState::SceneDetecting,
            PipelineState::SceneDetecting => PipelineState::AudioAnalyzing,
            PipelineState::AudioAnalyzing => PipelineState::AudioEnhancing,
            PipelineState::AudioEnhancing => PipelineState::RuleGenerating,
            PipelineState::RuleGenerating => PipelineState::Rendering,
            PipelineState::Rendering | PipelineState::Done => PipelineState::Done,
            PipelineState::Failed => PipelineState::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Exporting => "exporting",
            PipelineState::SceneDetecting => "scene_detecting",
            PipelineState::AudioAnalyzing => "audio_analyzing",
            PipelineState::AudioEnhancing => "audio_enhancing",
            PipelineState::RuleGenerating => "rule_generating",
            PipelineState::Rendering => "rendering",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Settings and shared limits common to every file of a batch.
#[derive(Debug)]
pub struct PipelineContext {
    pub output_dir: PathBuf,
    pub prompt: String,
    pub stage_timeout: Option<Duration>,
    pub audio_max_duration_secs: Option<f64>,
    rule_permits: Semaphore,
}

impl PipelineContext {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            prompt: config.prompt.clone(),
            stage_timeout: config.stage_timeout,
            audio_max_duration_secs: config.audio_max_duration_secs,
            rule_permits: Semaphore::new(config.max_concurrent_rule_requests.max(1)),
        }
    }
}

/// Stage payloads gathered on the way to `Done`.
#[derive(Debug, Default)]
struct Collected {
    scenes: Vec<SceneSpan>,
    audio: Option<AudioAnalysis>,
    operations: Vec<EditOperation>,
    saved_rules: Option<PathBuf>,
}

/// One input video's run through the stage sequence.
pub struct FilePipeline {
    input: InputVideo,
    artifacts: ArtifactPaths,
    adapters: StageAdapters,
    context: Arc<PipelineContext>,
    progress: watch::Sender<Stage>,
}

impl FilePipeline {
    pub fn new(input: InputVideo, adapters: StageAdapters, context: Arc<PipelineContext>) -> Self {
        let artifacts = input.artifacts(&context.output_dir);
        let (progress, _) = watch::channel(Stage::FrameExport);
        Self {
            input,
            artifacts,
            adapters,
            context,
            progress,
        }
    }

    /// Follow the stage currently running, e.g. to attribute an aborted task.
    pub fn progress(&self) -> watch::Receiver<Stage> {
        self.progress.subscribe()
    }

    /// Run every stage in order, stopping at the first failure.
    pub async fn run(self) -> ProcessingResult {
        let started = Instant::now();
        let name = self.input.name.clone();
        let mut collected = Collected::default();
        let mut state = PipelineState::Exporting;
        tracing::info!(input = %name, "Processing video");

        let failure = loop {
            if state.is_terminal() {
                break None;
            }
            if let Some(stage) = state.stage() {
                self.progress.send_replace(stage);
            }
            match self.step(state, &mut collected).await {
                Ok(()) => {
                    let next = state.next();
                    tracing::debug!(input = %name, from = %state, to = %next, "State transition");
                    state = next;
                }
                Err(failure) => {
                    tracing::debug!(input = %name, from = %state, to = %PipelineState::Failed, "State transition");
                    break Some(failure);
                }
            }
        };

        let elapsed_secs = started.elapsed().as_secs_f64();
        let outcome = match failure {
            None => {
                tracing::info!(
                    input = %name,
                    operations = collected.operations.len(),
                    elapsed_secs,
                    "Video processed"
                );
                Outcome::Success {
                    artifacts: self.artifacts.clone(),
                    summary: AnalysisSummary {
                        scene_count: collected.scenes.len(),
                        tempo_bpm: collected.audio.as_ref().map_or(0.0, |a| a.tempo_bpm),
                        beat_count: collected.audio.as_ref().map_or(0, |a| a.beat_frames.len()),
                        operations: collected.operations,
                    },
                }
            }
            Some(failure) => {
                tracing::error!(
                    input = %name,
                    stage = %failure.stage,
                    kind = %failure.kind,
                    elapsed_secs,
                    "Video failed"
                );
                Outcome::Failed {
                    failure,
                    saved_rules: collected.saved_rules,
                }
            }
        };

        ProcessingResult {
            input: self.input,
            outcome,
            elapsed_secs,
        }
    }

    async fn step(&self, state: PipelineState, collected: &mut Collected) -> StageResult<()> {
        let video = self.input.path.as_path();
        let name = self.input.name.as_str();
        let timeout = self.context.stage_timeout;
        let adapters = &self.adapters;

        match state {
            PipelineState::Exporting => {
                invoke(
                    Stage::FrameExport,
                    timeout,
                    name,
                    adapters.frames.export_frames(video, &self.artifacts),
                )
                .await
            }
            PipelineState::SceneDetecting => {
                let scenes = invoke(
                    Stage::SceneDetection,
                    timeout,
                    name,
                    adapters.scenes.detect_scenes(video),
                )
                .await?;
                tracing::info!(input = name, scenes = scenes.len(), "Scenes detected");
                collected.scenes = scenes;
                Ok(())
            }
            PipelineState::AudioAnalyzing => {
                let analysis = invoke(
                    Stage::AudioAnalysis,
                    timeout,
                    name,
                    adapters
                        .audio_analyzer
                        .analyze_audio(video, self.context.audio_max_duration_secs),
                )
                .await?;
                tracing::info!(
                    input = name,
                    tempo_bpm = analysis.tempo_bpm,
                    beats = analysis.beat_frames.len(),
                    "Audio analysed"
                );
                collected.audio = Some(analysis);
                Ok(())
            }
            PipelineState::AudioEnhancing => {
                invoke(
                    Stage::AudioEnhancement,
                    timeout,
                    name,
                    adapters
                        .audio_enhancer
                        .enhance_audio(video, &self.artifacts.enhanced_audio),
                )
                .await
            }
            PipelineState::RuleGenerating => {
                let rules = {
                    let _permit = self.context.rule_permits.acquire().await.map_err(|e| {
                        StageFailure::new(
                            Stage::RuleGeneration,
                            ErrorKind::GenerationError,
                            format!("Rule request limiter closed: {e}"),
                        )
                    })?;
                    invoke(
                        Stage::RuleGeneration,
                        timeout,
                        name,
                        adapters.rules.generate_rules(&self.context.prompt),
                    )
                    .await?
                };

                save_rules(&self.artifacts.rules, rules.as_str()).await?;
                collected.saved_rules = Some(self.artifacts.rules.clone());

                collected.operations = clipsmith_rule_engine::parse(&rules);
                tracing::info!(
                    input = name,
                    operations = ?collected
                        .operations
                        .iter()
                        .map(|op| op.to_string())
                        .collect::<Vec<_>>(),
                    "Rules interpreted"
                );
                Ok(())
            }
            PipelineState::Rendering => {
                invoke(
                    Stage::Render,
                    timeout,
                    name,
                    adapters
                        .renderer
                        .render(video, &collected.operations, &self.artifacts.processed_video),
                )
                .await
            }
            PipelineState::Done | PipelineState::Failed => Ok(()),
        }
    }
}

/// Persist the rule sidecar. A write failure belongs to rule generation.
async fn save_rules(path: &Path, text: &str) -> StageResult<()> {
    tokio::fs::write(path, text).await.map_err(|e| {
        let failure = StageFailure::from_error(Stage::RuleGeneration, &ClipsmithError::Io(e));
        tracing::error!(
            path = %path.display(),
            kind = %failure.kind,
            cause = %failure.cause,
            "Failed to save rules"
        );
        failure
    })?;
    tracing::info!(path = %path.display(), "Rules saved");
    Ok(())
}
