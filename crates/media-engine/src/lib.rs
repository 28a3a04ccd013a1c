//! Clipsmith Media Engine
//!
//! Thin, typed wrappers over the `ffmpeg` and `ffprobe` binaries:
//!
//! ```text
//! source.mp4 ──┬── probe ──────────── duration / streams
//!              ├── frame export ───── <name>_frame_0001.png ...
//!              ├── scdet ──────────── scene spans
//!              ├── PCM decode ─────── samples for audio-dsp
//!              └── render ─────────── edit operations → filter chain
//!                                            │
//!                                            ▼
//!                                     processed_<name>
//! ```

pub mod ffmpeg;
pub mod frames;
pub mod render;
pub mod scenes;

pub use ffmpeg::{command_exists, decode_mono_pcm, probe_media, DecodedAudio, MediaInfo};
pub use frames::export_frames;
pub use render::{render_video, RenderPlan};
pub use scenes::detect_scenes;
