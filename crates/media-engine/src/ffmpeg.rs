//! Process plumbing for ffmpeg and ffprobe.

use std::path::Path;
use std::process::Stdio;

use clipsmith_common::error::{ClipsmithError, ClipsmithResult};
use serde::Deserialize;
use tokio::process::Command;

/// Lines of stderr kept in error messages.
const STDERR_TAIL_LINES: usize = 20;

/// Captured output of a finished tool invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: Vec<u8>,
    pub stderr: String,
}

/// Run `binary` with `args` and wait for it.
///
/// The child is killed if the returned future is dropped, so callers can
/// bound it with `tokio::time::timeout`. A spawn failure or non-zero exit
/// is reported as a message carrying the tail of stderr; callers wrap it
/// in the error kind of their stage.
pub async fn run_tool(binary: &str, args: &[String]) -> Result<ToolOutput, String> {
    tracing::debug!(binary, args = ?args, "Running media tool");

    let output = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| format!("Failed to start {binary}: {e}"))?;

    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    if !output.status.success() {
        return Err(format!(
            "{binary} failed ({}): {}",
            output.status,
            stderr_tail(&stderr)
        ));
    }

    Ok(ToolOutput {
        stdout: output.stdout,
        stderr,
    })
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

/// Whether a binary is resolvable on `PATH`.
pub fn command_exists(binary: &str) -> bool {
    std::process::Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Stream and container facts needed by the stages.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    pub duration_secs: f64,
    pub has_video: bool,
    pub has_audio: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub audio_sample_rate: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    sample_rate: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Inspect a media file with ffprobe.
pub async fn probe_media(path: &Path) -> ClipsmithResult<MediaInfo> {
    if !path.exists() {
        return Err(ClipsmithError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let args = vec![
        "-v".to_string(),
        "error".to_string(),
        "-print_format".to_string(),
        "json".to_string(),
        "-show_entries".to_string(),
        "format=duration:stream=codec_type,width,height,sample_rate,duration".to_string(),
        path.display().to_string(),
    ];
    let output = run_tool("ffprobe", &args)
        .await
        .map_err(ClipsmithError::decode)?;
    parse_probe_json(&String::from_utf8_lossy(&output.stdout))
}

/// Parse the JSON document printed by [`probe_media`]'s ffprobe call.
pub fn parse_probe_json(raw: &str) -> ClipsmithResult<MediaInfo> {
    let probe: ProbeOutput = serde_json::from_str(raw)
        .map_err(|e| ClipsmithError::decode(format!("Unreadable ffprobe output: {e}")))?;

    let video = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));
    let audio = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"));

    if video.is_none() && audio.is_none() {
        return Err(ClipsmithError::decode("No audio or video streams found"));
    }

    // Containers without an index report the format duration as "N/A";
    // the longest stream duration is the next best answer.
    let duration_secs = probe
        .format
        .as_ref()
        .and_then(|f| parse_duration(f.duration.as_deref()))
        .or_else(|| {
            probe
                .streams
                .iter()
                .filter_map(|s| parse_duration(s.duration.as_deref()))
                .reduce(f64::max)
        })
        .unwrap_or(0.0);

    Ok(MediaInfo {
        duration_secs,
        has_video: video.is_some(),
        has_audio: audio.is_some(),
        width: video.and_then(|v| v.width),
        height: video.and_then(|v| v.height),
        audio_sample_rate: audio
            .and_then(|a| a.sample_rate.as_deref())
            .and_then(|r| r.parse::<u32>().ok()),
    })
}

fn parse_duration(raw: Option<&str>) -> Option<f64> {
    raw?.parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d > 0.0)
}

/// Mono PCM samples decoded from a media file.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Decode the first audio stream to mono `f32` samples.
///
/// `sample_rate: None` keeps the source rate. `max_duration_secs` caps how
/// much audio is decoded.
pub async fn decode_mono_pcm(
    path: &Path,
    sample_rate: Option<u32>,
    max_duration_secs: Option<f64>,
) -> ClipsmithResult<DecodedAudio> {
    let info = probe_media(path).await?;
    if !info.has_audio {
        return Err(ClipsmithError::decode(format!(
            "{} has no audio stream",
            path.display()
        )));
    }
    let rate = match sample_rate.or(info.audio_sample_rate) {
        Some(rate) if rate > 0 => rate,
        _ => {
            return Err(ClipsmithError::decode(format!(
                "Unknown audio sample rate for {}",
                path.display()
            )))
        }
    };

    let mut args = vec![
        "-v".to_string(),
        "error".to_string(),
        "-i".to_string(),
        path.display().to_string(),
    ];
    if let Some(max) = max_duration_secs.filter(|m| *m > 0.0) {
        args.push("-t".to_string());
        args.push(format!("{max:.3}"));
    }
    args.extend([
        "-vn".to_string(),
        "-ac".to_string(),
        "1".to_string(),
        "-ar".to_string(),
        rate.to_string(),
        "-f".to_string(),
        "f32le".to_string(),
        "-acodec".to_string(),
        "pcm_f32le".to_string(),
        "pipe:1".to_string(),
    ]);

    let output = run_tool("ffmpeg", &args)
        .await
        .map_err(ClipsmithError::decode)?;

    Ok(DecodedAudio {
        samples: f32le_to_samples(&output.stdout),
        sample_rate: rate,
    })
}

fn f32le_to_samples(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}
