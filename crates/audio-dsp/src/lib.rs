//! Clipsmith Audio Intelligence
//!
//! In-process audio processing on PCM decoded by the media engine:
//! - **Onset envelope:** spectral flux over a Hann-windowed STFT
//! - **Tempo:** onset autocorrelation weighted towards 120 BPM
//! - **Beats:** dynamic-programming beat tracking on the onset envelope
//! - **Enhancement:** pre-emphasis plus linear gain, written as float WAV

pub mod analysis;
pub mod beats;
pub mod enhance;
pub mod onset;
pub mod tempo;

pub use analysis::*;
pub use enhance::*;
