//! In-memory stage adapters for pipeline tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use clipsmith_common::error::{ClipsmithError, ClipsmithResult};
use clipsmith_edit_model::analysis::{AudioAnalysis, SceneSpan};
use clipsmith_edit_model::edit::{EditOperation, RuleText};
use clipsmith_edit_model::input::ArtifactPaths;
use clipsmith_edit_model::stage::Stage;
use clipsmith_pipeline::adapters::{
    AudioAnalyzer, AudioEnhancer, FrameExporter, Renderer, RuleGenerator, SceneDetector,
    StageAdapters,
};

pub const DEFAULT_RULES: &str = "Use slow motion on the pour\ntext: So crunchy\nfade out at the end";

/// Scripted collaborator that records every call and writes small
/// placeholder artifacts.
pub struct MockStages {
    pub calls: Mutex<Vec<(String, Stage)>>,
    pub rendered: Mutex<Vec<(String, Vec<EditOperation>)>>,
    pub rules_text: String,
    failures: Vec<(String, Stage)>,
    panics: Vec<(String, Stage)>,
    fail_rules: bool,
    delays: Vec<(String, Stage, Duration)>,
    rule_delay: Option<Duration>,
    rules_in_flight: AtomicUsize,
    pub max_rules_in_flight: AtomicUsize,
}

impl Default for MockStages {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            rendered: Mutex::new(Vec::new()),
            rules_text: DEFAULT_RULES.to_string(),
            failures: Vec::new(),
            panics: Vec::new(),
            fail_rules: false,
            delays: Vec::new(),
            rule_delay: None,
            rules_in_flight: AtomicUsize::new(0),
            max_rules_in_flight: AtomicUsize::new(0),
        }
    }
}

impl MockStages {
    pub fn failing(mut self, file: &str, stage: Stage) -> Self {
        self.failures.push((file.to_string(), stage));
        self
    }

    pub fn panicking(mut self, file: &str, stage: Stage) -> Self {
        self.panics.push((file.to_string(), stage));
        self
    }

    pub fn failing_rules(mut self) -> Self {
        self.fail_rules = true;
        self
    }

    pub fn delaying(mut self, file: &str, stage: Stage, delay: Duration) -> Self {
        self.delays.push((file.to_string(), stage, delay));
        self
    }

    pub fn slow_rules(mut self, delay: Duration) -> Self {
        self.rule_delay = Some(delay);
        self
    }

    pub fn with_rules(mut self, text: &str) -> Self {
        self.rules_text = text.to_string();
        self
    }

    pub fn into_adapters(self) -> (Arc<Self>, StageAdapters) {
        let mock = Arc::new(self);
        let adapters = StageAdapters {
            frames: mock.clone(),
            scenes: mock.clone(),
            audio_analyzer: mock.clone(),
            audio_enhancer: mock.clone(),
            rules: mock.clone(),
            renderer: mock.clone(),
        };
        (mock, adapters)
    }

    /// Stages called for `file`, in call order.
    pub fn stages_for(&self, file: &str) -> Vec<Stage> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == file)
            .map(|(_, stage)| *stage)
            .collect()
    }

    pub fn rule_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, stage)| *stage == Stage::RuleGeneration)
            .count()
    }

    async fn enter(&self, video: &Path, stage: Stage) -> ClipsmithResult<()> {
        let name = file_name(video);
        self.calls.lock().unwrap().push((name.clone(), stage));

        let delay = self
            .delays
            .iter()
            .find(|(file, s, _)| *file == name && *s == stage)
            .map(|(_, _, d)| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.panics.iter().any(|(file, s)| *file == name && *s == stage) {
            panic!("scripted panic in {stage} for {name}");
        }
        if self.failures.iter().any(|(file, s)| *file == name && *s == stage) {
            return Err(error_for(stage, &name));
        }
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn error_for(stage: Stage, name: &str) -> ClipsmithError {
    let message = format!("scripted failure for {name}");
    match stage {
        Stage::FrameExport => ClipsmithError::decode(message),
        Stage::SceneDetection | Stage::AudioAnalysis => ClipsmithError::detection(message),
        Stage::AudioEnhancement => ClipsmithError::enhancement(message),
        Stage::RuleGeneration => ClipsmithError::generation(message),
        Stage::Render => ClipsmithError::render(message),
    }
}

fn first_frame(artifacts: &ArtifactPaths) -> PathBuf {
    PathBuf::from(
        artifacts
            .frame_pattern
            .to_string_lossy()
            .replace("%04d", "0001"),
    )
}

#[async_trait]
impl FrameExporter for MockStages {
    async fn export_frames(&self, video: &Path, artifacts: &ArtifactPaths) -> ClipsmithResult<()> {
        self.enter(video, Stage::FrameExport).await?;
        std::fs::write(first_frame(artifacts), b"png")?;
        Ok(())
    }
}

#[async_trait]
impl SceneDetector for MockStages {
    async fn detect_scenes(&self, video: &Path) -> ClipsmithResult<Vec<SceneSpan>> {
        self.enter(video, Stage::SceneDetection).await?;
        Ok(vec![
            SceneSpan {
                start_secs: 0.0,
                end_secs: 2.5,
            },
            SceneSpan {
                start_secs: 2.5,
                end_secs: 6.0,
            },
        ])
    }
}

#[async_trait]
impl AudioAnalyzer for MockStages {
    async fn analyze_audio(
        &self,
        media: &Path,
        max_duration_secs: Option<f64>,
    ) -> ClipsmithResult<AudioAnalysis> {
        self.enter(media, Stage::AudioAnalysis).await?;
        Ok(AudioAnalysis {
            tempo_bpm: 120.0,
            beat_frames: vec![0, 22, 44, 66],
            beat_times: vec![0.0, 0.51, 1.02, 1.53],
            sample_rate: 22_050,
            hop_length: 512,
            analysed_secs: max_duration_secs.unwrap_or(6.0).min(6.0),
        })
    }
}

#[async_trait]
impl AudioEnhancer for MockStages {
    async fn enhance_audio(&self, media: &Path, output: &Path) -> ClipsmithResult<()> {
        self.enter(media, Stage::AudioEnhancement).await?;
        std::fs::write(output, b"wav")?;
        Ok(())
    }
}

#[async_trait]
impl RuleGenerator for MockStages {
    async fn generate_rules(&self, _prompt: &str) -> ClipsmithResult<RuleText> {
        // The prompt does not identify the file; record under a shared name.
        self.calls
            .lock()
            .unwrap()
            .push(("*".to_string(), Stage::RuleGeneration));

        let now = self.rules_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_rules_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.rule_delay {
            tokio::time::sleep(delay).await;
        }
        self.rules_in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_rules {
            return Err(ClipsmithError::generation("service unavailable"));
        }
        Ok(RuleText::new(self.rules_text.clone()))
    }
}

#[async_trait]
impl Renderer for MockStages {
    async fn render(
        &self,
        video: &Path,
        operations: &[EditOperation],
        output: &Path,
    ) -> ClipsmithResult<()> {
        self.enter(video, Stage::Render).await?;
        self.rendered
            .lock()
            .unwrap()
            .push((file_name(video), operations.to_vec()));
        std::fs::write(output, format!("{operations:?}"))?;
        Ok(())
    }
}
