//! Shot boundary detection using ffmpeg's `scdet` filter.
//!
//! `scdet` logs one line per detected change:
//! `[scdet @ 0x...] lavfi.scd.score: 23.410, lavfi.scd.time: 4.2`.
//! Cut times become consecutive `(start, end)` spans covering the clip.

use std::path::Path;

use clipsmith_common::config::SceneDetectionConfig;
use clipsmith_common::error::{ClipsmithError, ClipsmithResult};
use clipsmith_edit_model::analysis::SceneSpan;

use crate::ffmpeg::run_tool;

/// Detect shot boundaries. A single-shot clip yields no spans.
pub async fn detect_scenes(
    video: &Path,
    config: &SceneDetectionConfig,
) -> ClipsmithResult<Vec<SceneSpan>> {
    tracing::info!(
        input = %video.display(),
        threshold = config.threshold,
        "Detecting scenes"
    );

    if !video.exists() {
        return Err(ClipsmithError::FileNotFound {
            path: video.to_path_buf(),
        });
    }

    let args = vec![
        "-hide_banner".to_string(),
        "-nostats".to_string(),
        "-i".to_string(),
        video.display().to_string(),
        "-vf".to_string(),
        format!("scdet=t={}:s=1", config.threshold),
        "-an".to_string(),
        "-f".to_string(),
        "null".to_string(),
        "-".to_string(),
    ];
    let output = run_tool("ffmpeg", &args)
        .await
        .map_err(ClipsmithError::detection)?;

    let detection = parse_scdet_log(&output.stderr, config);
    let spans = spans_from_cuts(&detection.cuts, detection.duration_secs);
    tracing::info!(
        input = %video.display(),
        cuts = detection.cuts.len(),
        scenes = spans.len(),
        "Scene detection finished"
    );
    Ok(spans)
}

/// Cut times and clip duration recovered from an ffmpeg log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScdetLog {
    pub cuts: Vec<f64>,
    pub duration_secs: Option<f64>,
}

/// Extract cut times above the threshold, honouring the minimum spacing.
pub fn parse_scdet_log(stderr: &str, config: &SceneDetectionConfig) -> ScdetLog {
    let mut log = ScdetLog::default();

    for line in stderr.lines() {
        if log.duration_secs.is_none() && line.contains("Duration:") {
            log.duration_secs = parse_duration_line(line);
        }

        let Some((score, time)) = parse_scdet_line(line) else {
            continue;
        };
        if score < config.threshold {
            continue;
        }
        if let Some(last) = log.cuts.last() {
            if time <= *last || time - last < config.min_scene_duration_secs {
                tracing::debug!(time, last, "Skipping cut too close to previous");
                continue;
            }
        }
        log.cuts.push(time);
    }

    log
}

fn parse_scdet_line(line: &str) -> Option<(f64, f64)> {
    let score_at = line.find("lavfi.scd.score:")? + "lavfi.scd.score:".len();
    let time_at = line.find("lavfi.scd.time:")? + "lavfi.scd.time:".len();
    let score = line[score_at..].split(',').next()?.trim().parse().ok()?;
    let time = line[time_at..].split(',').next()?.trim().parse().ok()?;
    Some((score, time))
}

/// Parse `  Duration: HH:MM:SS.ss, start: ...` into seconds.
fn parse_duration_line(line: &str) -> Option<f64> {
    let start = line.find("Duration:")? + "Duration:".len();
    let stamp = line[start..].split(',').next()?.trim();
    let mut parts = stamp.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Turn ascending cut times into spans from 0 to the clip end.
pub fn spans_from_cuts(cuts: &[f64], duration_secs: Option<f64>) -> Vec<SceneSpan> {
    let Some(&last_cut) = cuts.last() else {
        return Vec::new();
    };

    let end = duration_secs.unwrap_or(last_cut).max(last_cut);
    let mut spans = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0.0;
    for &cut in cuts {
        spans.push(SceneSpan {
            start_secs: start,
            end_secs: cut,
        });
        start = cut;
    }
    if end > start {
        spans.push(SceneSpan {
            start_secs: start,
            end_secs: end,
        });
    }
    spans
}
