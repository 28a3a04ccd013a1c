//! Payloads produced by the analysis stages.

use serde::{Deserialize, Serialize};

/// A shot between two detected cuts, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneSpan {
    pub start_secs: f64,
    pub end_secs: f64,
}

/// Tempo and beat grid of a media file's audio track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioAnalysis {
    /// Global tempo estimate in beats per minute (0 for silence).
    pub tempo_bpm: f64,

    /// Beat positions as onset-envelope frame indices, ascending.
    pub beat_frames: Vec<usize>,

    /// Beat positions in seconds, ascending.
    pub beat_times: Vec<f64>,

    /// Sample rate the analysis ran at.
    pub sample_rate: u32,

    /// Samples between onset-envelope frames.
    pub hop_length: usize,

    /// Seconds of audio actually analysed.
    pub analysed_secs: f64,
}
