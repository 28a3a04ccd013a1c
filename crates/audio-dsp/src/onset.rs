//! Spectral-flux onset strength envelope.

use std::f32::consts::PI;

use rustfft::{num_complex::Complex, FftPlanner};

/// STFT window size in samples.
pub const FRAME_SIZE: usize = 2048;

/// Samples between consecutive envelope frames.
pub const HOP_LENGTH: usize = 512;

/// Magnitude compression gain applied before differencing.
const LOG_COMPRESSION: f32 = 100.0;

/// Compute the onset strength of `samples`, one value per hop.
///
/// Frames are centred: frame `t` covers samples around `t * HOP_LENGTH`,
/// with zero padding at both ends. The first frame has no predecessor and
/// always scores zero.
pub fn onset_envelope(samples: &[f32]) -> Vec<f32> {
    let n_frames = 1 + samples.len() / HOP_LENGTH;
    let pad = FRAME_SIZE / 2;

    let mut padded = vec![0.0f32; samples.len() + FRAME_SIZE];
    padded[pad..pad + samples.len()].copy_from_slice(samples);

    let window = hann_window(FRAME_SIZE);
    let fft = FftPlanner::<f32>::new().plan_fft_forward(FRAME_SIZE);
    let bins = FRAME_SIZE / 2 + 1;

    let mut buffer = vec![Complex::new(0.0f32, 0.0); FRAME_SIZE];
    let mut previous = vec![0.0f32; bins];
    let mut current = vec![0.0f32; bins];
    let mut envelope = Vec::with_capacity(n_frames);

    for t in 0..n_frames {
        let start = t * HOP_LENGTH;
        let frame = &padded[start..start + FRAME_SIZE];
        for ((slot, &sample), &w) in buffer.iter_mut().zip(frame).zip(&window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        fft.process(&mut buffer);

        for (mag, c) in current.iter_mut().zip(&buffer[..bins]) {
            *mag = (1.0 + LOG_COMPRESSION * c.norm()).ln();
        }

        let flux = if t == 0 {
            0.0
        } else {
            current
                .iter()
                .zip(&previous)
                .map(|(c, p)| (c - p).max(0.0))
                .sum::<f32>()
        };
        envelope.push(flux);
        std::mem::swap(&mut previous, &mut current);
    }

    envelope
}

/// Periodic Hann window.
fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f32 / size as f32).cos())
        .collect()
}
