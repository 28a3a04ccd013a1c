//! Still-frame export.

use std::path::Path;

use clipsmith_common::error::{ClipsmithError, ClipsmithResult};
use clipsmith_edit_model::input::ArtifactPaths;

use crate::ffmpeg::run_tool;

/// Write every frame of `video` as a numbered PNG following
/// `artifacts.frame_pattern`.
///
/// An unusable destination is an I/O error; anything ffmpeg rejects
/// (missing or undecodable source) is a decode error.
pub async fn export_frames(video: &Path, artifacts: &ArtifactPaths) -> ClipsmithResult<()> {
    tracing::info!(
        input = %video.display(),
        pattern = %artifacts.frame_pattern.display(),
        "Exporting frames"
    );

    ensure_writable_dir(&artifacts.frames_dir)?;
    if !video.exists() {
        return Err(ClipsmithError::FileNotFound {
            path: video.to_path_buf(),
        });
    }

    let args = vec![
        "-y".to_string(),
        "-v".to_string(),
        "error".to_string(),
        "-i".to_string(),
        video.display().to_string(),
        escape_image_pattern(&artifacts.frame_pattern.display().to_string()),
    ];
    run_tool("ffmpeg", &args)
        .await
        .map_err(ClipsmithError::decode)?;
    Ok(())
}

fn ensure_writable_dir(dir: &Path) -> ClipsmithResult<()> {
    let metadata = std::fs::metadata(dir)?;
    if !metadata.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} is not a directory", dir.display()),
        )
        .into());
    }
    if metadata.permissions().readonly() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            format!("{} is not writable", dir.display()),
        )
        .into());
    }
    Ok(())
}

/// Escape literal `%` in a file name so only the trailing `%04d` is
/// treated as the frame counter by ffmpeg's image muxer.
fn escape_image_pattern(pattern: &str) -> String {
    match pattern.rsplit_once("%04d") {
        Some((head, tail)) => format!("{}%04d{}", head.replace('%', "%%"), tail),
        None => pattern.replace('%', "%%"),
    }
}
