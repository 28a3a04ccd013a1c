//! Stage adapters: the seams between the pipeline and external work.
//!
//! Each trait wraps one collaborator and reports failures as
//! [`ClipsmithError`](clipsmith_common::error::ClipsmithError) values whose
//! kind (or the stage default) ends up in the processing result.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use clipsmith_common::config::{AppConfig, AudioConfig, RenderConfig, SceneDetectionConfig};
use clipsmith_common::error::ClipsmithResult;
use clipsmith_edit_model::analysis::{AudioAnalysis, SceneSpan};
use clipsmith_edit_model::edit::{EditOperation, RuleText};
use clipsmith_edit_model::input::ArtifactPaths;
use clipsmith_rule_generator::RuleGeneratorClient;

/// Writes a video's frames as numbered still images.
#[async_trait]
pub trait FrameExporter: Send + Sync {
    async fn export_frames(&self, video: &Path, artifacts: &ArtifactPaths) -> ClipsmithResult<()>;
}

/// Finds shot boundaries. An empty result means a single shot.
#[async_trait]
pub trait SceneDetector: Send + Sync {
    async fn detect_scenes(&self, video: &Path) -> ClipsmithResult<Vec<SceneSpan>>;
}

/// Estimates tempo and beat positions.
#[async_trait]
pub trait AudioAnalyzer: Send + Sync {
    async fn analyze_audio(
        &self,
        media: &Path,
        max_duration_secs: Option<f64>,
    ) -> ClipsmithResult<AudioAnalysis>;
}

/// Produces the enhanced audio waveform.
#[async_trait]
pub trait AudioEnhancer: Send + Sync {
    async fn enhance_audio(&self, media: &Path, output: &Path) -> ClipsmithResult<()>;
}

/// Turns a prompt into rule text.
#[async_trait]
pub trait RuleGenerator: Send + Sync {
    async fn generate_rules(&self, prompt: &str) -> ClipsmithResult<RuleText>;
}

/// Applies edit operations and encodes the final video.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(
        &self,
        video: &Path,
        operations: &[EditOperation],
        output: &Path,
    ) -> ClipsmithResult<()>;
}

/// One adapter per stage, shared by every file of a batch.
#[derive(Clone)]
pub struct StageAdapters {
    pub frames: Arc<dyn FrameExporter>,
    pub scenes: Arc<dyn SceneDetector>,
    pub audio_analyzer: Arc<dyn AudioAnalyzer>,
    pub audio_enhancer: Arc<dyn AudioEnhancer>,
    pub rules: Arc<dyn RuleGenerator>,
    pub renderer: Arc<dyn Renderer>,
}

impl StageAdapters {
    /// Default adapters: ffmpeg for media work, in-process DSP for audio,
    /// HTTP for rule generation.
    pub fn from_config(config: &AppConfig) -> ClipsmithResult<Self> {
        let client = RuleGeneratorClient::from_config(&config.rule_generator)?;
        if !client.has_api_key() {
            tracing::warn!(
                env = %config.rule_generator.api_key_env,
                "Rule generator API key is not set; rule generation will fail"
            );
        }

        Ok(Self {
            frames: Arc::new(FfmpegFrameExporter),
            scenes: Arc::new(FfmpegSceneDetector::new(config.scenes.clone())),
            audio_analyzer: Arc::new(DspAudioAnalyzer::new(config.audio.clone())),
            audio_enhancer: Arc::new(DspAudioEnhancer::new(config.audio.clone())),
            rules: Arc::new(HttpRuleGenerator::new(client)),
            renderer: Arc::new(FfmpegRenderer::new(config.render.clone())),
        })
    }
}

impl std::fmt::Debug for StageAdapters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageAdapters").finish_non_exhaustive()
    }
}

/// Frame export through `ffmpeg`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegFrameExporter;

#[async_trait]
impl FrameExporter for FfmpegFrameExporter {
    async fn export_frames(&self, video: &Path, artifacts: &ArtifactPaths) -> ClipsmithResult<()> {
        clipsmith_media_engine::export_frames(video, artifacts).await
    }
}

/// Scene detection through ffmpeg's `scdet` filter.
#[derive(Debug, Clone)]
pub struct FfmpegSceneDetector {
    config: SceneDetectionConfig,
}

impl FfmpegSceneDetector {
    pub fn new(config: SceneDetectionConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SceneDetector for FfmpegSceneDetector {
    async fn detect_scenes(&self, video: &Path) -> ClipsmithResult<Vec<SceneSpan>> {
        clipsmith_media_engine::detect_scenes(video, &self.config).await
    }
}

/// Tempo and beat tracking on decoded PCM.
#[derive(Debug, Clone)]
pub struct DspAudioAnalyzer {
    config: AudioConfig,
}

impl DspAudioAnalyzer {
    pub fn new(config: AudioConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl AudioAnalyzer for DspAudioAnalyzer {
    async fn analyze_audio(
        &self,
        media: &Path,
        max_duration_secs: Option<f64>,
    ) -> ClipsmithResult<AudioAnalysis> {
        clipsmith_audio_dsp::analyze_audio(media, &self.config, max_duration_secs).await
    }
}

/// Pre-emphasis and gain, written as float WAV.
#[derive(Debug, Clone)]
pub struct DspAudioEnhancer {
    config: AudioConfig,
}

impl DspAudioEnhancer {
    pub fn new(config: AudioConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl AudioEnhancer for DspAudioEnhancer {
    async fn enhance_audio(&self, media: &Path, output: &Path) -> ClipsmithResult<()> {
        clipsmith_audio_dsp::enhance_audio(media, output, &self.config).await
    }
}

/// Rule generation against an OpenAI-compatible completions endpoint.
#[derive(Debug)]
pub struct HttpRuleGenerator {
    client: RuleGeneratorClient,
}

impl HttpRuleGenerator {
    pub fn new(client: RuleGeneratorClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RuleGenerator for HttpRuleGenerator {
    async fn generate_rules(&self, prompt: &str) -> ClipsmithResult<RuleText> {
        self.client.generate(prompt).await
    }
}

/// Edit rendering through an ffmpeg filter graph.
#[derive(Debug, Clone)]
pub struct FfmpegRenderer {
    config: RenderConfig,
}

impl FfmpegRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Renderer for FfmpegRenderer {
    async fn render(
        &self,
        video: &Path,
        operations: &[EditOperation],
        output: &Path,
    ) -> ClipsmithResult<()> {
        clipsmith_media_engine::render_video(video, operations, output, &self.config).await
    }
}
