//! Render edit operations into a final encoded video.
//!
//! Operations become ffmpeg filters in the exact order they were parsed;
//! nothing is reordered or merged. The running output duration is tracked
//! so a fade placed after a slow-motion step ends at the stretched end.

use std::path::Path;

use clipsmith_common::config::RenderConfig;
use clipsmith_common::error::{ClipsmithError, ClipsmithResult};
use clipsmith_edit_model::edit::EditOperation;

use crate::ffmpeg::{probe_media, run_tool, MediaInfo};

/// Slowest speed a single `atempo` instance accepts.
const ATEMPO_MIN: f64 = 0.5;
/// Fastest speed a single `atempo` instance accepts.
const ATEMPO_MAX: f64 = 100.0;

/// Filter chains derived from an operation sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderPlan {
    pub video_filters: Vec<String>,
    pub audio_filters: Vec<String>,
    pub output_duration_secs: f64,
}

impl RenderPlan {
    /// Translate `operations` for a source described by `info`.
    pub fn build(operations: &[EditOperation], info: &MediaInfo, config: &RenderConfig) -> Self {
        let mut plan = RenderPlan {
            output_duration_secs: info.duration_secs,
            ..Default::default()
        };

        for op in operations {
            match op {
                EditOperation::SlowMotion { factor } => {
                    if !factor.is_finite() || *factor <= 0.0 {
                        tracing::warn!(factor, "Ignoring non-positive speed factor");
                        continue;
                    }
                    plan.video_filters.push(format!("setpts=PTS/{factor:.6}"));
                    if info.has_audio {
                        plan.audio_filters.extend(atempo_chain(*factor));
                    }
                    plan.output_duration_secs /= factor;
                }
                EditOperation::BrightnessAdjust { factor } => {
                    plan.video_filters.push(format!(
                        "colorchannelmixer=rr={factor:.6}:gg={factor:.6}:bb={factor:.6}"
                    ));
                }
                EditOperation::OverlayText { content } => {
                    plan.video_filters.push(format!(
                        "drawtext=expansion=none:text={text}:fontsize={size}:fontcolor={color}:x=(w-text_w)/2:y=(h-text_h)/2",
                        text = escape_filter_value(content),
                        size = config.font_size,
                        color = escape_filter_value(&config.font_color),
                    ));
                }
                EditOperation::FadeInOut {
                    fade_in_secs,
                    fade_out_secs,
                } => {
                    plan.video_filters
                        .push(format!("fade=t=in:st=0:d={fade_in_secs:.6}"));
                    // The fade-out is anchored to the end; without a known
                    // end it would black out the whole clip.
                    if plan.output_duration_secs <= 0.0 {
                        tracing::warn!(
                            fade_out_secs,
                            "Source duration unknown, skipping fade-out"
                        );
                        continue;
                    }
                    let fade_out_start = (plan.output_duration_secs - fade_out_secs).max(0.0);
                    plan.video_filters.push(format!(
                        "fade=t=out:st={fade_out_start:.6}:d={fade_out_secs:.6}"
                    ));
                }
            }
        }

        plan
    }

    /// Full ffmpeg argument list for rendering `input` into `output`.
    pub fn ffmpeg_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-v".to_string(),
            "error".to_string(),
            "-i".to_string(),
            input.display().to_string(),
        ];
        if !self.video_filters.is_empty() {
            args.push("-vf".to_string());
            args.push(self.video_filters.join(","));
        }
        if !self.audio_filters.is_empty() {
            args.push("-af".to_string());
            args.push(self.audio_filters.join(","));
        }
        args.extend(codec_args_for_output(output));
        args.push(output.display().to_string());
        args
    }
}

/// Apply `operations` to `input` and encode the result to `output`.
///
/// An empty operation list performs a straight re-encode.
pub async fn render_video(
    input: &Path,
    operations: &[EditOperation],
    output: &Path,
    config: &RenderConfig,
) -> ClipsmithResult<()> {
    let started = std::time::Instant::now();
    let info = probe_media(input).await?;
    if !info.has_video {
        return Err(ClipsmithError::render(format!(
            "{} has no video stream",
            input.display()
        )));
    }

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let plan = RenderPlan::build(operations, &info, config);
    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        operations = operations.len(),
        video_filters = plan.video_filters.len(),
        audio_filters = plan.audio_filters.len(),
        output_duration_secs = plan.output_duration_secs,
        "Render plan built"
    );

    run_tool("ffmpeg", &plan.ffmpeg_args(input, output))
        .await
        .map_err(ClipsmithError::render)?;

    tracing::info!(
        output = %output.display(),
        elapsed_secs = started.elapsed().as_secs_f64(),
        "Render finished"
    );
    Ok(())
}

/// Split a speed factor into `atempo` steps within the filter's range.
fn atempo_chain(factor: f64) -> Vec<String> {
    let mut remaining = factor;
    let mut chain = Vec::new();
    while remaining < ATEMPO_MIN {
        chain.push(format!("atempo={ATEMPO_MIN:.6}"));
        remaining /= ATEMPO_MIN;
    }
    while remaining > ATEMPO_MAX {
        chain.push(format!("atempo={ATEMPO_MAX:.6}"));
        remaining /= ATEMPO_MAX;
    }
    chain.push(format!("atempo={remaining:.6}"));
    chain
}

/// Escape a value for a filter option inside a filtergraph.
///
/// Two levels: option syntax (`\ ' :`) then graph syntax (`\ ' , ; [ ]`).
fn escape_filter_value(value: &str) -> String {
    let mut option_level = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '\'' | ':') {
            option_level.push('\\');
        }
        option_level.push(ch);
    }

    let mut graph_level = String::with_capacity(option_level.len());
    for ch in option_level.chars() {
        if matches!(ch, '\\' | '\'' | ',' | ';' | '[' | ']') {
            graph_level.push('\\');
        }
        graph_level.push(ch);
    }
    graph_level
}

fn codec_args_for_output(output: &Path) -> Vec<String> {
    let ext = output
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "webm" => vec![
            "-c:v".to_string(),
            "libvpx-vp9".to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-c:a".to_string(),
            "libopus".to_string(),
            "-b:a".to_string(),
            "128k".to_string(),
        ],
        _ => {
            let mut args = vec![
                "-c:v".to_string(),
                "libx264".to_string(),
                "-preset".to_string(),
                "medium".to_string(),
                "-pix_fmt".to_string(),
                "yuv420p".to_string(),
                "-c:a".to_string(),
                "aac".to_string(),
                "-b:a".to_string(),
                "192k".to_string(),
            ];
            if matches!(ext.as_str(), "mp4" | "m4v" | "mov") {
                args.push("-movflags".to_string());
                args.push("+faststart".to_string());
            }
            args
        }
    }
}
