//! Audio file I/O for Wavrec
//!
//! Decodes RIFF/WAVE byte buffers of any common depth into `DecodedAudio`,
//! resamples to a target rate, and writes encoded files to disk.
//!
//! Sample rate conversion uses linear interpolation.

use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::engine::buffer::{deinterleave, DecodedAudio};
use crate::error::{Result, WavrecError};
use crate::wav::{dequantize_sample, WaveFile};

/// Decodes WAVE data with `hound`
#[derive(Debug, Clone, Copy, Default)]
pub struct HoundDecoder;

impl HoundDecoder {
    /// Create a decoder
    pub fn new() -> Self {
        HoundDecoder
    }

    /// Decode an in-memory WAVE file
    ///
    /// # Errors
    /// * `DecodeError` - the bytes are not a readable WAVE stream
    /// * `UnsupportedFormat` - a bit depth other than 8, 16, 24 or 32
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<DecodedAudio> {
        let reader = WavReader::new(Cursor::new(bytes)).map_err(|e| WavrecError::DecodeError {
            reason: format!("Failed to open WAV data: {}", e),
            source: Some(Box::new(e)),
        })?;
        decode_reader(reader)
    }

    /// Decode a WAVE file from disk
    pub fn decode_file(&self, path: &Path) -> Result<DecodedAudio> {
        let bytes = fs::read(path)?;
        self.decode_bytes(&bytes)
    }
}

/// Write an encoded file to disk
pub fn write_wave_file(wave: &WaveFile, path: &Path) -> Result<()> {
    fs::write(path, wave.as_bytes()).map_err(|e| WavrecError::DeliveryError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Resample decoded audio to `target_rate`
///
/// Returns the input unchanged when the rates already match.
///
/// # Errors
/// * `MalformedInput` - `target_rate` is zero, or `decoded` is not valid audio
pub fn resample(decoded: DecodedAudio, target_rate: u32) -> Result<DecodedAudio> {
    decoded.validate()?;
    if target_rate == 0 {
        return Err(WavrecError::malformed("target sample rate must be positive"));
    }
    if decoded.sample_rate == target_rate {
        return Ok(decoded);
    }

    log::debug!(
        "Resampling {} channel(s) from {} Hz to {} Hz",
        decoded.channel_count(),
        decoded.sample_rate,
        target_rate
    );

    let channels = resample_channels(&decoded.channels, decoded.sample_rate, target_rate);
    DecodedAudio::new(channels, target_rate)
}

// ============================================================================
// Internal helper functions
// ============================================================================

fn decode_reader<R: Read>(reader: WavReader<R>) -> Result<DecodedAudio> {
    let spec = reader.spec();
    let channels = spec.channels as usize;

    if channels == 0 {
        return Err(WavrecError::DecodeError {
            reason: "WAV data declares zero channels".to_string(),
            source: None,
        });
    }

    let samples = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;
    if samples.len() % channels != 0 {
        log::warn!(
            "Dropping {} trailing sample(s) of a partial frame",
            samples.len() % channels
        );
    }

    DecodedAudio::new(deinterleave(&samples, channels), spec.sample_rate)
}

/// Read samples from WAV reader and convert to f32
fn read_samples_as_f32<R: Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    match sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| decode_error("float", e)),
        SampleFormat::Int => match bits_per_sample {
            8 => reader
                .samples::<i8>()
                .map(|s| s.map(|v| v as f32 / 128.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| decode_error("8-bit", e)),
            16 => reader
                .samples::<i16>()
                .map(|s| s.map(dequantize_sample))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| decode_error("16-bit", e)),
            // 24-bit stored as i32 in hound
            24 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 8388608.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| decode_error("24-bit", e)),
            32 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 2147483648.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| decode_error("32-bit int", e)),
            _ => Err(WavrecError::UnsupportedFormat {
                format: format!("{}-bit integer audio", bits_per_sample),
            }),
        },
    }
}

fn decode_error(kind: &str, e: hound::Error) -> WavrecError {
    WavrecError::DecodeError {
        reason: format!("Failed to read {} samples: {}", kind, e),
        source: Some(Box::new(e)),
    }
}

/// Resample audio channels to a different sample rate
fn resample_channels(channels: &[Vec<f32>], source_rate: u32, target_rate: u32) -> Vec<Vec<f32>> {
    let ratio = target_rate as f64 / source_rate as f64;

    channels
        .iter()
        .map(|channel| resample_linear(channel, ratio))
        .collect()
}

/// Linear interpolation resampling
fn resample_linear(samples: &[f32], ratio: f64) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }

    let source_len = samples.len();
    let target_len = ((source_len as f64) * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(target_len);

    for i in 0..target_len {
        // Map output index to source position
        let src_pos = i as f64 / ratio;
        let src_idx = src_pos.floor() as usize;
        let frac = (src_pos - src_idx as f64) as f32;

        let sample = if src_idx + 1 < source_len {
            samples[src_idx] * (1.0 - frac) + samples[src_idx + 1] * frac
        } else if src_idx < source_len {
            samples[src_idx]
        } else {
            0.0
        };

        output.push(sample);
    }

    output
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::buffer::{generate_test_tone, interleave};
    use crate::wav::encode;
    use approx::assert_abs_diff_eq;
    use hound::{WavSpec, WavWriter};
    use tempfile::tempdir;

    fn hound_bytes<S: hound::Sample + Copy>(spec: WavSpec, samples: &[S]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for &sample in samples {
                writer.write_sample(sample).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_decode_own_encoding() {
        let original = generate_test_tone(440.0, 0.05, 8000, 2, 0.8).unwrap();
        let wav = encode(&interleave(&original).unwrap(), 8000).unwrap();

        let decoded = HoundDecoder::new().decode_bytes(wav.as_bytes()).unwrap();
        assert_eq!(decoded.sample_rate, 8000);
        assert_eq!(decoded.channel_count(), 2);
        assert_eq!(decoded.frame_count(), original.frame_count());

        for (orig, dec) in original.channels[0].iter().zip(&decoded.channels[0]) {
            assert_abs_diff_eq!(*orig, *dec, epsilon = 2.0 / 32768.0);
        }
    }

    #[test]
    fn test_decode_24bit() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 24,
            sample_format: SampleFormat::Int,
        };
        let bytes = hound_bytes(spec, &[4194304i32, -8388608]);

        let decoded = HoundDecoder::new().decode_bytes(&bytes).unwrap();
        assert_eq!(decoded.channels, vec![vec![0.5, -1.0]]);
    }

    #[test]
    fn test_decode_float() {
        let spec = WavSpec {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let bytes = hound_bytes(spec, &[0.25f32, -0.25, 1.5, -1.5]);

        let decoded = HoundDecoder::new().decode_bytes(&bytes).unwrap();
        assert_eq!(decoded.channels, vec![vec![0.25, 1.5], vec![-0.25, -1.5]]);
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let err = HoundDecoder::new().decode_bytes(b"not a wave file").unwrap_err();
        assert_eq!(err.error_code(), "DECODE_ERROR");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_decode_file_missing_is_io_error() {
        let err = HoundDecoder::new()
            .decode_file(Path::new("/nonexistent/path/audio.wav"))
            .unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }

    #[test]
    fn test_write_wave_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");

        let tone = generate_test_tone(1000.0, 0.1, 16000, 1, 0.5).unwrap();
        let wav = encode(&interleave(&tone).unwrap(), 16000).unwrap();
        write_wave_file(&wav, &path).unwrap();

        assert_eq!(fs::read(&path).unwrap(), wav.as_bytes());
        let decoded = HoundDecoder::new().decode_file(&path).unwrap();
        assert_eq!(decoded.frame_count(), 1600);
    }

    #[test]
    fn test_resample_rejects_invalid_audio() {
        let zero_rate = DecodedAudio {
            channels: vec![vec![0.0]],
            sample_rate: 0,
        };
        let err = resample(zero_rate, 8000).unwrap_err();
        assert_eq!(err.error_code(), "MALFORMED_INPUT");

        let ragged = DecodedAudio {
            channels: vec![vec![0.0; 4], vec![0.0; 3]],
            sample_rate: 16000,
        };
        assert!(resample(ragged, 8000).is_err());
    }

    #[test]
    fn test_write_wave_file_missing_dir() {
        let wav = encode(
            &interleave(&DecodedAudio::new(vec![vec![]], 8000).unwrap()).unwrap(),
            8000,
        )
        .unwrap();
        let err = write_wave_file(&wav, Path::new("/nonexistent/dir/x.wav")).unwrap_err();
        assert_eq!(err.error_code(), "DELIVERY_ERROR");
    }

    #[test]
    fn test_resample_same_rate_is_identity() {
        let tone = generate_test_tone(440.0, 0.1, 48000, 2, 0.5).unwrap();
        assert_eq!(resample(tone.clone(), 48000).unwrap(), tone);
    }

    #[test]
    fn test_resample_changes_length() {
        let tone = generate_test_tone(440.0, 0.5, 48000, 2, 0.5).unwrap();
        let resampled = resample(tone, 44100).unwrap();
        assert_eq!(resampled.sample_rate, 44100);
        assert!((resampled.frame_count() as i64 - 22050).abs() <= 1);
        assert_eq!(resampled.channel_count(), 2);
    }

    #[test]
    fn test_resample_rejects_zero_rate() {
        let tone = generate_test_tone(440.0, 0.01, 8000, 1, 0.5).unwrap();
        assert!(resample(tone, 0).is_err());
    }

    #[test]
    fn test_resample_linear_upsample() {
        let resampled = resample_linear(&[0.0, 1.0, 0.0], 2.0);
        assert_eq!(resampled.len(), 6);
        // Index 1 maps to source position 0.5
        assert_abs_diff_eq!(resampled[1], 0.5, epsilon = 0.01);
    }

    #[test]
    fn test_resample_linear_downsample() {
        let samples = vec![0.0, 0.5, 1.0, 0.5, 0.0, -0.5, -1.0, -0.5];
        assert_eq!(resample_linear(&samples, 0.5).len(), 4);
    }
}
