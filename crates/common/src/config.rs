//! Application and pipeline configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClipsmithError, ClipsmithResult};

/// Global application configuration (`config.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Batch defaults applied when the CLI does not override them.
    pub pipeline: PipelineDefaults,

    /// Generative text service settings.
    pub rule_generator: RuleGeneratorConfig,

    /// Scene boundary detection settings.
    pub scenes: SceneDetectionConfig,

    /// Audio analysis and enhancement settings.
    pub audio: AudioConfig,

    /// Render settings.
    pub render: RenderConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Batch defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineDefaults {
    /// Files per chunk.
    pub batch_size: usize,

    /// Per-stage timeout in seconds (None = wait indefinitely).
    pub stage_timeout_secs: Option<u64>,

    /// Upper bound on in-flight rule generation requests.
    pub max_concurrent_rule_requests: usize,

    /// Container extensions eligible for processing (without the dot).
    pub allowed_extensions: Vec<String>,

    /// Cap on the audio decoded for analysis, in seconds.
    pub audio_max_duration_secs: Option<f64>,
}

/// Generative text service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleGeneratorConfig {
    /// OpenAI-compatible API base URL.
    pub endpoint: String,

    /// Completion model name.
    pub model: String,

    /// Maximum tokens in the generated rule text.
    pub max_tokens: u32,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
}

/// Scene detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDetectionConfig {
    /// `scdet` threshold on the 0-100 scale. Lower is more sensitive.
    pub threshold: f64,

    /// Minimum spacing between cuts in seconds.
    pub min_scene_duration_secs: f64,
}

/// Audio configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Sample rate audio is decoded at for tempo/beat analysis.
    pub analysis_sample_rate: u32,

    /// Pre-emphasis coefficient used by enhancement.
    pub pre_emphasis: f32,

    /// Linear gain applied after pre-emphasis.
    pub gain: f32,
}

/// Render configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Overlay text font size.
    pub font_size: u32,

    /// Overlay text color (ffmpeg color name or hex).
    pub font_color: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "clipsmith_pipeline=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for PipelineDefaults {
    fn default() -> Self {
        Self {
            batch_size: 1,
            stage_timeout_secs: None,
            max_concurrent_rule_requests: 1,
            allowed_extensions: vec!["mp4".to_string(), "webm".to_string()],
            audio_max_duration_secs: Some(60.0),
        }
    }
}

impl Default for RuleGeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo-instruct".to_string(),
            max_tokens: 150,
            api_key_env: "OPENAI_API_KEY".to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl Default for SceneDetectionConfig {
    fn default() -> Self {
        Self {
            threshold: 10.0,
            min_scene_duration_secs: 0.0,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            analysis_sample_rate: 22_050,
            pre_emphasis: 0.97,
            gain: 1.5,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_size: 70,
            font_color: "white".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }
}

/// Everything the batch orchestrator needs for one run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory scanned for input videos.
    pub input_dir: PathBuf,

    /// Directory receiving every artifact and the batch report.
    pub output_dir: PathBuf,

    /// Prompt sent to the rule generator for every file.
    pub prompt: String,

    /// Files per chunk. Files within a chunk may run concurrently.
    pub batch_size: usize,

    /// Upper bound on a single stage call.
    pub stage_timeout: Option<Duration>,

    /// Upper bound on in-flight rule generation requests.
    pub max_concurrent_rule_requests: usize,

    /// Eligible container extensions, compared case-insensitively.
    pub allowed_extensions: Vec<String>,

    /// Cap on the audio decoded for analysis, in seconds.
    pub audio_max_duration_secs: Option<f64>,
}

impl PipelineConfig {
    /// Build a run configuration from the required inputs and file defaults.
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        prompt: impl Into<String>,
        defaults: &PipelineDefaults,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            prompt: prompt.into(),
            batch_size: defaults.batch_size,
            stage_timeout: defaults.stage_timeout_secs.map(Duration::from_secs),
            max_concurrent_rule_requests: defaults.max_concurrent_rule_requests,
            allowed_extensions: defaults.allowed_extensions.clone(),
            audio_max_duration_secs: defaults.audio_max_duration_secs,
        }
    }

    /// Reject settings the orchestrator cannot run with.
    pub fn validate(&self) -> ClipsmithResult<()> {
        if self.batch_size == 0 {
            return Err(ClipsmithError::config("batch_size must be at least 1"));
        }
        if self.max_concurrent_rule_requests == 0 {
            return Err(ClipsmithError::config(
                "max_concurrent_rule_requests must be at least 1",
            ));
        }
        if self.prompt.trim().is_empty() {
            return Err(ClipsmithError::config("prompt must not be empty"));
        }
        if self.allowed_extensions.is_empty() {
            return Err(ClipsmithError::config(
                "allowed_extensions must list at least one extension",
            ));
        }
        Ok(())
    }

    /// Whether a file name carries one of the allowed extensions.
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("clipsmith").join("config.json")
}

/// The config file in effect: an explicit override, else the standard location.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PipelineConfig {
        PipelineConfig::new("in", "out", "make it asmr", &PipelineDefaults::default())
    }

    #[test]
    fn test_defaults_match_reference_batch() {
        let config = sample();
        assert_eq!(config.batch_size, 1);
        assert_eq!(config.max_concurrent_rule_requests, 1);
        assert!(config.stage_timeout.is_none());
        assert_eq!(config.audio_max_duration_secs, Some(60.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let mut config = sample();
        config.batch_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ClipsmithError::Config { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_blank_prompt() {
        let mut config = sample();
        config.prompt = "   ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_accepts_allowed_extensions_case_insensitively() {
        let config = sample();
        assert!(config.accepts(Path::new("clip.mp4")));
        assert!(config.accepts(Path::new("clip.WEBM")));
        assert!(!config.accepts(Path::new("clip.mov")));
        assert!(!config.accepts(Path::new("README")));
    }

    #[test]
    fn test_partial_config_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"pipeline":{"batch_size":4},"render":{"font_size":48}}"#)
            .unwrap();

        let config = AppConfig::load_from(&path);
        assert_eq!(config.pipeline.batch_size, 4);
        assert_eq!(config.pipeline.max_concurrent_rule_requests, 1);
        assert_eq!(config.render.font_size, 48);
        assert_eq!(config.render.font_color, "white");
        assert_eq!(config.rule_generator.max_tokens, 150);
    }

    #[test]
    fn test_explicit_config_path_wins() {
        let explicit = Path::new("/srv/clipsmith/batch.json");
        assert_eq!(resolve_config_path(Some(explicit)), explicit);
        assert_eq!(resolve_config_path(None), config_file_path());
    }

    #[test]
    fn test_unparseable_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        let config = AppConfig::load_from(&path);
        assert_eq!(config.pipeline.batch_size, 1);
    }
}
