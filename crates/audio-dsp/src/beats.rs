//! Dynamic-programming beat tracker.
//!
//! Each frame's cumulative score is its normalised onset strength plus the
//! best predecessor score, penalised by how far the inter-beat interval
//! strays from the tempo period (log-ratio squared, scaled by tightness).
//! Beats are recovered by backtracking from the strongest frame near the
//! end of the envelope.

/// Penalty weight for deviating from the tempo period.
pub const TIGHTNESS: f64 = 100.0;

/// Track beats through `onset` for a beat period given in frames.
///
/// Returns ascending frame indices; empty when there is nothing to track.
pub fn track_beats(onset: &[f32], period_frames: f64) -> Vec<usize> {
    if onset.is_empty() || !period_frames.is_finite() || period_frames < 1.0 {
        return Vec::new();
    }

    let Some(local) = normalise(onset) else {
        return Vec::new();
    };

    let n = local.len();
    let min_step = ((period_frames / 2.0).round() as usize).max(1);
    let max_step = ((period_frames * 2.0).round() as usize).max(min_step);

    let mut cumulative = vec![0.0f64; n];
    let mut backlink: Vec<Option<usize>> = vec![None; n];

    for i in 0..n {
        let mut best: Option<(usize, f64)> = None;
        if i >= min_step {
            let earliest = i.saturating_sub(max_step);
            for prev in earliest..=i - min_step {
                let interval = (i - prev) as f64 / period_frames;
                let score = cumulative[prev] - TIGHTNESS * interval.ln().powi(2);
                if best.map_or(true, |(_, s)| score > s) {
                    best = Some((prev, score));
                }
            }
        }

        match best {
            Some((prev, score)) if score > 0.0 => {
                cumulative[i] = local[i] + score;
                backlink[i] = Some(prev);
            }
            _ => cumulative[i] = local[i],
        }
    }

    let tail_start = n.saturating_sub(period_frames.ceil() as usize);
    let Some(mut current) = (tail_start..n).max_by(|&a, &b| cumulative[a].total_cmp(&cumulative[b]))
    else {
        return Vec::new();
    };

    let mut beats = vec![current];
    while let Some(prev) = backlink[current] {
        beats.push(prev);
        current = prev;
    }
    beats.reverse();
    beats
}

/// Scale the envelope to unit standard deviation. `None` for a flat input.
fn normalise(onset: &[f32]) -> Option<Vec<f64>> {
    let n = onset.len() as f64;
    let mean = onset.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = onset
        .iter()
        .map(|&v| (v as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    let std = variance.sqrt();
    if std <= f64::EPSILON {
        return None;
    }
    Some(onset.iter().map(|&v| v as f64 / std).collect())
}

/// Convert frame indices to seconds.
pub fn frames_to_times(frames: &[usize], sample_rate: u32, hop_length: usize) -> Vec<f64> {
    if sample_rate == 0 {
        return Vec::new();
    }
    frames
        .iter()
        .map(|&f| (f * hop_length) as f64 / sample_rate as f64)
        .collect()
}
