//! 16-bit PCM WAVE encoder
//!
//! Serializes interleaved float samples into a canonical WAVE blob: the
//! fixed 44-byte header followed by little-endian signed 16-bit samples.
//! Output is byte-for-byte deterministic for identical input.

use crate::engine::buffer::InterleavedSamples;
use crate::error::{Result, WavrecError};
use crate::wav::format::{WavFormat, WavHeader, HEADER_LEN};

/// Negative full scale
const NEGATIVE_SCALE: f64 = 32768.0;

/// Positive full scale
const POSITIVE_SCALE: f64 = 32767.0;

/// An encoded WAVE file held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveFile {
    bytes: Vec<u8>,
}

impl WaveFile {
    /// The complete file, header included
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume and return the file bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Total length in bytes (`44 + data_len`)
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True only for a buffer without a header, which `encode` never produces
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The 16-bit PCM payload after the header
    pub fn payload(&self) -> &[u8] {
        &self.bytes[HEADER_LEN.min(self.bytes.len())..]
    }

    /// Parse the header back out
    pub fn header(&self) -> Result<WavHeader> {
        WavHeader::parse(&self.bytes)
    }
}

impl AsRef<[u8]> for WaveFile {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Quantize one float sample to signed 16-bit
///
/// The value is clamped to `[-1.0, 1.0]`, then negative values are scaled by
/// 32768 and non-negative values by 32767 and truncated toward zero, so both
/// full-scale ends are reachable without overflow. NaN maps to 0.
///
/// The product is formed in `f64`, where it is exact, so truncation sees
/// the true scaled value rather than one rounded up to the next integer.
#[inline]
pub fn quantize_sample(sample: f32) -> i16 {
    let clamped = f64::from(sample.clamp(-1.0, 1.0));
    if clamped < 0.0 {
        (clamped * NEGATIVE_SCALE) as i16
    } else {
        (clamped * POSITIVE_SCALE) as i16
    }
}

/// Map a 16-bit sample back to float using the inverse of `quantize_sample`
#[inline]
pub fn dequantize_sample(sample: i16) -> f32 {
    let scaled = if sample < 0 {
        f64::from(sample) / NEGATIVE_SCALE
    } else {
        f64::from(sample) / POSITIVE_SCALE
    };
    scaled as f32
}

/// Encode interleaved samples as a 16-bit PCM WAVE file
///
/// The channel count comes from `samples`. A stream with zero frames yields
/// a bare 44-byte header with an empty data chunk.
///
/// # Errors
/// * `MalformedInput` - zero sample rate, or more audio than a RIFF file can hold
pub fn encode(samples: &InterleavedSamples, sample_rate: u32) -> Result<WaveFile> {
    let format = WavFormat::pcm16(samples.channel_count(), sample_rate)?;
    encode_with_format(samples.samples(), &format)
}

/// Encode a raw interleaved slice with an explicit format
///
/// # Errors
/// * `MalformedInput` - zero channels or sample rate, a sample count that is
///   not a whole number of frames, or a payload too large for the 32-bit size fields
/// * `UnsupportedFormat` - a bit depth other than 16
pub fn encode_with_format(samples: &[f32], format: &WavFormat) -> Result<WaveFile> {
    // Fields are public, so re-check what `WavFormat::new` guarantees
    let format = &WavFormat::new(format.channels, format.sample_rate, format.bits_per_sample)?;

    if samples.len() % format.channels as usize != 0 {
        return Err(WavrecError::malformed(format!(
            "sample count {} is not divisible by channel count {}",
            samples.len(),
            format.channels
        )));
    }

    let data_len = samples
        .len()
        .checked_mul(format.bytes_per_sample() as usize)
        .ok_or_else(|| WavrecError::malformed("sample count overflows the payload size"))?;
    let header = WavHeader::for_payload(format, data_len)?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + data_len);
    bytes.extend_from_slice(&header.to_bytes());
    for &sample in samples {
        bytes.extend_from_slice(&quantize_sample(sample).to_le_bytes());
    }

    log::debug!(
        "Encoded {} frames ({} ch @ {} Hz) into {} bytes",
        samples.len() / format.channels as usize,
        format.channels,
        format.sample_rate,
        bytes.len()
    );

    Ok(WaveFile { bytes })
}
