//! Input videos and the artifact paths derived from them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A source video discovered in the input directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputVideo {
    /// File name, used as the namespace for every derived artifact.
    pub name: String,

    /// Full path to the source file.
    pub path: PathBuf,

    /// Lowercased container extension (e.g. "mp4").
    pub format: String,
}

impl InputVideo {
    /// Describe a file on disk. Returns `None` for paths without a file
    /// name or without an extension.
    ///
    /// Names that are not valid UTF-8 are converted lossily for artifact
    /// naming; `path` keeps the real file name.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let name = path.file_name()?.to_string_lossy().into_owned();
        let format = path.extension()?.to_string_lossy().to_ascii_lowercase();
        Some(Self { name, path, format })
    }

    /// Artifact locations for this input inside `output_dir`.
    pub fn artifacts(&self, output_dir: &Path) -> ArtifactPaths {
        ArtifactPaths::for_input(output_dir, &self.name)
    }
}

/// Output locations owned by a single input video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    /// Rendered video: `processed_<name>`.
    pub processed_video: PathBuf,

    /// Enhanced waveform: `enhanced_audio_<name>.wav`.
    pub enhanced_audio: PathBuf,

    /// Saved rule text: `rules_<name>.txt`.
    pub rules: PathBuf,

    /// Directory receiving exported frames.
    pub frames_dir: PathBuf,

    /// ffmpeg image sequence pattern: `<name>_frame_%04d.png`.
    pub frame_pattern: PathBuf,
}

impl ArtifactPaths {
    pub fn for_input(output_dir: &Path, name: &str) -> Self {
        Self {
            processed_video: output_dir.join(format!("processed_{name}")),
            enhanced_audio: output_dir.join(format!("enhanced_audio_{name}.wav")),
            rules: output_dir.join(format!("rules_{name}.txt")),
            frames_dir: output_dir.to_path_buf(),
            frame_pattern: output_dir.join(format!("{name}_frame_%04d.png")),
        }
    }

    /// Paths that must exist after a successful run.
    pub fn required_files(&self) -> [&Path; 3] {
        [&self.processed_video, &self.enhanced_audio, &self.rules]
    }
}
