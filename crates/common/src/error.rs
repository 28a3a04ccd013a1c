//! Error types shared across Clipsmith crates.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level error type for Clipsmith operations.
#[derive(Debug, thiserror::Error)]
pub enum ClipsmithError {
    #[error("Decode error: {message}")]
    Decode { message: String },

    #[error("Detection error: {message}")]
    Detection { message: String },

    #[error("Enhancement error: {message}")]
    Enhancement { message: String },

    #[error("Generation error: {message}")]
    Generation { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Timed out after {secs}s")]
    Timeout { secs: f64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ClipsmithError.
pub type ClipsmithResult<T> = Result<T, ClipsmithError>;

/// Failure taxonomy recorded in processing results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Unreadable or corrupt source media.
    DecodeError,
    /// Scene or audio analysis failure.
    DetectionError,
    /// Audio filter failure.
    EnhancementError,
    /// Rule generation service failure, including network and timeouts.
    GenerationError,
    /// Composition or encode failure.
    RenderError,
    /// Filesystem create/write failure.
    #[serde(rename = "IOError")]
    IoError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::DecodeError => "DecodeError",
            ErrorKind::DetectionError => "DetectionError",
            ErrorKind::EnhancementError => "EnhancementError",
            ErrorKind::GenerationError => "GenerationError",
            ErrorKind::RenderError => "RenderError",
            ErrorKind::IoError => "IOError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ClipsmithError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode {
            message: msg.into(),
        }
    }

    pub fn detection(msg: impl Into<String>) -> Self {
        Self::Detection {
            message: msg.into(),
        }
    }

    pub fn enhancement(msg: impl Into<String>) -> Self {
        Self::Enhancement {
            message: msg.into(),
        }
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// The taxonomy kind this error carries on its own, if any.
    ///
    /// Errors without an intrinsic kind (timeouts, configuration, JSON,
    /// opaque errors) take the default kind of the stage that raised them.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ClipsmithError::Decode { .. } | ClipsmithError::FileNotFound { .. } => {
                Some(ErrorKind::DecodeError)
            }
            ClipsmithError::Detection { .. } => Some(ErrorKind::DetectionError),
            ClipsmithError::Enhancement { .. } => Some(ErrorKind::EnhancementError),
            ClipsmithError::Generation { .. } => Some(ErrorKind::GenerationError),
            ClipsmithError::Render { .. } => Some(ErrorKind::RenderError),
            ClipsmithError::Io(_) => Some(ErrorKind::IoError),
            ClipsmithError::Config { .. }
            | ClipsmithError::Timeout { .. }
            | ClipsmithError::Json(_)
            | ClipsmithError::Other(_) => None,
        }
    }
}
