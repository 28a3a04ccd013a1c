//! Global tempo estimation from an onset envelope.

/// Slowest tempo considered.
pub const MIN_BPM: f64 = 30.0;

/// Fastest tempo considered.
pub const MAX_BPM: f64 = 320.0;

/// Centre of the log-normal tempo prior.
const PRIOR_BPM: f64 = 120.0;

/// Width of the tempo prior in octaves.
const PRIOR_OCTAVES: f64 = 1.0;

/// Estimate the dominant tempo in beats per minute.
///
/// Returns 0.0 when the envelope carries no periodic energy (silence,
/// too-short input).
pub fn estimate_tempo(onset: &[f32], sample_rate: u32, hop_length: usize) -> f64 {
    if sample_rate == 0 || hop_length == 0 || onset.len() < 2 {
        return 0.0;
    }
    if onset.iter().all(|&v| v <= f32::EPSILON) {
        return 0.0;
    }

    let frames_per_sec = sample_rate as f64 / hop_length as f64;
    let min_lag = ((60.0 * frames_per_sec / MAX_BPM).ceil() as usize).max(1);
    let max_lag = ((60.0 * frames_per_sec / MIN_BPM).floor() as usize).min(onset.len() - 1);
    if min_lag > max_lag {
        return 0.0;
    }

    let mean = onset.iter().map(|&v| v as f64).sum::<f64>() / onset.len() as f64;
    let centred: Vec<f64> = onset.iter().map(|&v| v as f64 - mean).collect();

    let mut best: Option<(usize, f64)> = None;
    for lag in min_lag..=max_lag {
        let score = autocorrelation(&centred, lag) * tempo_prior(lag_to_bpm(lag, frames_per_sec));
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((lag, score));
        }
    }

    match best {
        Some((lag, score)) if score > 0.0 => {
            let bpm = lag_to_bpm(lag, frames_per_sec);
            tracing::debug!(lag, bpm, score, "Tempo estimated");
            bpm
        }
        _ => 0.0,
    }
}

/// Beat period in envelope frames for a tempo.
pub fn beat_period_frames(bpm: f64, sample_rate: u32, hop_length: usize) -> f64 {
    60.0 * sample_rate as f64 / (hop_length as f64 * bpm)
}

fn lag_to_bpm(lag: usize, frames_per_sec: f64) -> f64 {
    60.0 * frames_per_sec / lag as f64
}

/// Mean lagged product, normalised by overlap so long lags are not penalised.
fn autocorrelation(signal: &[f64], lag: usize) -> f64 {
    let overlap = signal.len() - lag;
    let sum: f64 = signal[..overlap]
        .iter()
        .zip(&signal[lag..])
        .map(|(a, b)| a * b)
        .sum();
    sum / overlap as f64
}

fn tempo_prior(bpm: f64) -> f64 {
    let octaves = (bpm / PRIOR_BPM).log2() / PRIOR_OCTAVES;
    (-0.5 * octaves * octaves).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_has_no_tempo() {
        assert_eq!(estimate_tempo(&[0.0; 500], 22_050, 512), 0.0);
        assert_eq!(estimate_tempo(&[], 22_050, 512), 0.0);
    }

    #[test]
    fn test_periodic_envelope_tempo() {
        // A pulse every 20 frames at 22050/512 frames per second is ~129 BPM.
        let onset: Vec<f32> = (0..800).map(|i| if i % 20 == 0 { 1.0 } else { 0.0 }).collect();
        let bpm = estimate_tempo(&onset, 22_050, 512);
        let expected = 60.0 * 22_050.0 / 512.0 / 20.0;
        assert!((bpm - expected).abs() < 1e-6, "got {bpm}");
    }

    #[test]
    fn test_prior_prefers_120() {
        assert!((tempo_prior(120.0) - 1.0).abs() < 1e-12);
        assert!(tempo_prior(240.0) < tempo_prior(150.0));
        assert!((tempo_prior(60.0) - tempo_prior(240.0)).abs() < 1e-12);
    }

    #[test]
    fn test_beat_period_frames() {
        let period = beat_period_frames(60.0 * 22_050.0 / 512.0 / 22.0, 22_050, 512);
        assert!((period - 22.0).abs() < 1e-9);
    }
}
