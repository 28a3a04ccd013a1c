//! Tempo and beat analysis of a media file's audio track.

use std::path::Path;

use clipsmith_common::config::AudioConfig;
use clipsmith_common::error::{ClipsmithError, ClipsmithResult};
use clipsmith_edit_model::analysis::AudioAnalysis;
use clipsmith_media_engine::decode_mono_pcm;

use crate::beats::{frames_to_times, track_beats};
use crate::onset::{onset_envelope, HOP_LENGTH};
use crate::tempo::{beat_period_frames, estimate_tempo};

/// Decode up to `max_duration_secs` of audio from `path` and analyse it.
///
/// A file without an audio stream is a decode error; silence is not an
/// error and yields tempo 0 with no beats.
pub async fn analyze_audio(
    path: &Path,
    config: &AudioConfig,
    max_duration_secs: Option<f64>,
) -> ClipsmithResult<AudioAnalysis> {
    tracing::info!(
        input = %path.display(),
        sample_rate = config.analysis_sample_rate,
        max_duration_secs = ?max_duration_secs,
        "Analysing audio"
    );

    let audio = decode_mono_pcm(path, Some(config.analysis_sample_rate), max_duration_secs).await?;
    let sample_rate = audio.sample_rate;
    let analysis = tokio::task::spawn_blocking(move || analyze_samples(&audio.samples, sample_rate))
        .await
        .map_err(|e| ClipsmithError::detection(format!("Audio analysis task failed: {e}")))?;

    tracing::info!(
        input = %path.display(),
        tempo_bpm = analysis.tempo_bpm,
        beats = analysis.beat_frames.len(),
        analysed_secs = analysis.analysed_secs,
        "Audio analysis finished"
    );
    Ok(analysis)
}

/// Analyse mono PCM samples already in memory.
pub fn analyze_samples(samples: &[f32], sample_rate: u32) -> AudioAnalysis {
    let analysed_secs = if sample_rate == 0 {
        0.0
    } else {
        samples.len() as f64 / sample_rate as f64
    };

    let onset = onset_envelope(samples);
    let tempo_bpm = estimate_tempo(&onset, sample_rate, HOP_LENGTH);
    let beat_frames = if tempo_bpm > 0.0 {
        track_beats(&onset, beat_period_frames(tempo_bpm, sample_rate, HOP_LENGTH))
    } else {
        Vec::new()
    };
    let beat_times = frames_to_times(&beat_frames, sample_rate, HOP_LENGTH);

    AudioAnalysis {
        tempo_bpm,
        beat_frames,
        beat_times,
        sample_rate,
        hop_length: HOP_LENGTH,
        analysed_secs,
    }
}
