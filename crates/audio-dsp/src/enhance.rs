//! Audio enhancement: pre-emphasis followed by a fixed gain.

use std::path::Path;

use clipsmith_common::config::AudioConfig;
use clipsmith_common::error::{ClipsmithError, ClipsmithResult};
use clipsmith_media_engine::decode_mono_pcm;

/// Enhance the audio track of `input` and write it to `output` as a mono
/// 32-bit float WAV at the source sample rate.
///
/// The output is a pure function of the decoded samples, so re-running on
/// the same source produces an identical file.
pub async fn enhance_audio(
    input: &Path,
    output: &Path,
    config: &AudioConfig,
) -> ClipsmithResult<()> {
    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        pre_emphasis = config.pre_emphasis,
        gain = config.gain,
        "Enhancing audio"
    );

    let audio = decode_mono_pcm(input, None, None).await?;
    let coefficient = config.pre_emphasis;
    let gain = config.gain;
    let output_path = output.to_path_buf();
    let sample_rate = audio.sample_rate;
    let duration_secs = audio.duration_secs();

    tokio::task::spawn_blocking(move || {
        let mut samples = pre_emphasis(&audio.samples, coefficient);
        apply_gain(&mut samples, gain);
        write_wav_f32(&output_path, &samples, sample_rate)
    })
    .await
    .map_err(|e| ClipsmithError::enhancement(format!("Enhancement task failed: {e}")))??;

    tracing::info!(
        output = %output.display(),
        sample_rate,
        duration_secs,
        "Audio enhancement finished"
    );
    Ok(())
}

/// First-order high-pass: `y[n] = x[n] - coefficient * x[n-1]`, with
/// `x[-1] = 0`.
pub fn pre_emphasis(samples: &[f32], coefficient: f32) -> Vec<f32> {
    let mut previous = 0.0f32;
    samples
        .iter()
        .map(|&x| {
            let y = x - coefficient * previous;
            previous = x;
            y
        })
        .collect()
}

pub fn apply_gain(samples: &mut [f32], gain: f32) {
    for sample in samples.iter_mut() {
        *sample *= gain;
    }
}

/// Write mono float samples to a WAV file.
///
/// Filesystem failures surface as I/O errors; encoder failures as
/// enhancement errors.
pub fn write_wav_f32(path: &Path, samples: &[f32], sample_rate: u32) -> ClipsmithResult<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(map_hound_error)?;
    for &sample in samples {
        writer.write_sample(sample).map_err(map_hound_error)?;
    }
    writer.finalize().map_err(map_hound_error)?;
    Ok(())
}

fn map_hound_error(error: hound::Error) -> ClipsmithError {
    match error {
        hound::Error::IoError(e) => ClipsmithError::Io(e),
        other => ClipsmithError::enhancement(format!("WAV encoding failed: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipsmith_common::error::ErrorKind;

    #[test]
    fn test_pre_emphasis_values() {
        let out = pre_emphasis(&[1.0, 1.0, 0.0, -0.5], 0.97);
        let expected = [1.0, 0.03, -0.97, -0.5];
        for (a, b) in out.iter().zip(expected) {
            assert!((a - b).abs() < 1e-6, "{a} vs {b}");
        }
        assert!(pre_emphasis(&[], 0.97).is_empty());
    }

    #[test]
    fn test_gain_scales_without_clipping() {
        let mut samples = vec![0.5, -0.25, 0.0];
        apply_gain(&mut samples, 1.5);
        assert_eq!(samples, vec![0.75, -0.375, 0.0]);
    }

    #[test]
    fn test_wav_round_trip_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.wav");
        let second = dir.path().join("second.wav");
        let mut samples = pre_emphasis(&[0.1, 0.2, -0.3, 0.4], 0.97);
        apply_gain(&mut samples, 1.5);

        write_wav_f32(&first, &samples, 44_100).unwrap();
        write_wav_f32(&second, &samples, 44_100).unwrap();
        assert_eq!(
            std::fs::read(&first).unwrap(),
            std::fs::read(&second).unwrap()
        );

        let mut reader = hound::WavReader::open(&first).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 44_100);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_format, hound::SampleFormat::Float);
        let read: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(read, samples);
    }

    #[test]
    fn test_unwritable_destination_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.wav");
        let err = write_wav_f32(&path, &[0.0], 22_050).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::IoError));
    }

    #[tokio::test]
    async fn test_missing_source_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = enhance_audio(
            &dir.path().join("absent.mp4"),
            &dir.path().join("out.wav"),
            &AudioConfig::default(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::DecodeError));
    }
}
