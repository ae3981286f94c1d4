//! WAVE format description and the canonical 44-byte header

use serde::Serialize;

use crate::error::{Result, WavrecError};

/// Size of the canonical PCM header in bytes
pub const HEADER_LEN: usize = 44;

/// Size of the `fmt ` chunk body for plain PCM
pub const FMT_CHUNK_SIZE: u32 = 16;

/// `AudioFormat` tag for integer PCM
pub const PCM_FORMAT_TAG: u16 = 1;

/// The only bit depth the encoder writes
pub const BITS_PER_SAMPLE: u16 = 16;

/// Largest channel count whose block align fits in 16 bits
pub const MAX_CHANNELS: u16 = u16::MAX / 2;

/// Bytes of header that follow the RIFF size field, excluding the payload
const RIFF_OVERHEAD: u32 = 36;

/// WAV format parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WavFormat {
    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u16,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Bits per sample (always 16)
    pub bits_per_sample: u16,
}

impl WavFormat {
    /// Create a 16-bit PCM format
    pub fn pcm16(channels: u16, sample_rate: u32) -> Result<Self> {
        Self::new(channels, sample_rate, BITS_PER_SAMPLE)
    }

    /// Create a format, rejecting anything but 16-bit PCM
    ///
    /// # Errors
    /// * `UnsupportedFormat` - bit depth other than 16
    /// * `MalformedInput` - zero or too many channels, or zero sample rate
    pub fn new(channels: u16, sample_rate: u32, bits_per_sample: u16) -> Result<Self> {
        if bits_per_sample != BITS_PER_SAMPLE {
            return Err(WavrecError::UnsupportedFormat {
                format: format!("{}-bit PCM (only 16-bit is supported)", bits_per_sample),
            });
        }
        if channels == 0 {
            return Err(WavrecError::malformed("channel count must be at least 1"));
        }
        if channels > MAX_CHANNELS {
            return Err(WavrecError::malformed(format!(
                "{} channels does not fit the 16-bit block align field",
                channels
            )));
        }
        if sample_rate == 0 {
            return Err(WavrecError::malformed("sample rate must be positive"));
        }
        Ok(Self {
            channels,
            sample_rate,
            bits_per_sample,
        })
    }

    /// Bytes per sample (per channel)
    pub fn bytes_per_sample(&self) -> u16 {
        self.bits_per_sample / 8
    }

    /// Bytes per frame
    pub fn block_align(&self) -> u16 {
        self.channels * self.bytes_per_sample()
    }

    /// Bytes per second
    ///
    /// Computed in 64 bits: very high rates with many channels do not fit
    /// the 32-bit header field, which `WavHeader::for_payload` rejects.
    pub fn byte_rate(&self) -> u64 {
        self.sample_rate as u64 * self.block_align() as u64
    }
}

/// Parsed canonical WAVE header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WavHeader {
    /// `36 + data_len`
    pub chunk_size: u32,
    pub audio_format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    /// Payload length in bytes
    pub data_len: u32,
}

impl WavHeader {
    /// Header describing `data_len` bytes of payload in `format`
    ///
    /// # Errors
    /// * `MalformedInput` - payload or byte rate does not fit the 32-bit fields
    pub fn for_payload(format: &WavFormat, data_len: usize) -> Result<Self> {
        let data_len = u32::try_from(data_len)
            .ok()
            .filter(|len| len.checked_add(RIFF_OVERHEAD).is_some())
            .ok_or_else(|| {
                WavrecError::malformed(format!(
                    "{} bytes of audio exceeds the 4 GiB RIFF limit",
                    data_len
                ))
            })?;
        let byte_rate = u32::try_from(format.byte_rate()).map_err(|_| {
            WavrecError::malformed(format!(
                "byte rate {} does not fit the WAVE header",
                format.byte_rate()
            ))
        })?;

        Ok(Self {
            chunk_size: RIFF_OVERHEAD + data_len,
            audio_format: PCM_FORMAT_TAG,
            channels: format.channels,
            sample_rate: format.sample_rate,
            byte_rate,
            block_align: format.block_align(),
            bits_per_sample: format.bits_per_sample,
            data_len,
        })
    }

    /// Serialize to the 44 canonical little-endian bytes
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];

        // RIFF header
        out[0..4].copy_from_slice(b"RIFF");
        out[4..8].copy_from_slice(&self.chunk_size.to_le_bytes());
        out[8..12].copy_from_slice(b"WAVE");

        // fmt chunk
        out[12..16].copy_from_slice(b"fmt ");
        out[16..20].copy_from_slice(&FMT_CHUNK_SIZE.to_le_bytes());
        out[20..22].copy_from_slice(&self.audio_format.to_le_bytes());
        out[22..24].copy_from_slice(&self.channels.to_le_bytes());
        out[24..28].copy_from_slice(&self.sample_rate.to_le_bytes());
        out[28..32].copy_from_slice(&self.byte_rate.to_le_bytes());
        out[32..34].copy_from_slice(&self.block_align.to_le_bytes());
        out[34..36].copy_from_slice(&self.bits_per_sample.to_le_bytes());

        // data chunk
        out[36..40].copy_from_slice(b"data");
        out[40..44].copy_from_slice(&self.data_len.to_le_bytes());

        out
    }

    /// Parse the canonical header at the start of `bytes`
    ///
    /// Only the fixed 44-byte layout is understood; files with extra chunks
    /// between `fmt ` and `data` are rejected.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(WavrecError::malformed(format!(
                "{} bytes is too short for a WAVE header",
                bytes.len()
            )));
        }

        expect_tag(bytes, 0, b"RIFF")?;
        expect_tag(bytes, 8, b"WAVE")?;
        expect_tag(bytes, 12, b"fmt ")?;
        expect_tag(bytes, 36, b"data")?;

        let fmt_size = read_u32(bytes, 16);
        if fmt_size != FMT_CHUNK_SIZE {
            return Err(WavrecError::UnsupportedFormat {
                format: format!("fmt chunk of {} bytes", fmt_size),
            });
        }

        Ok(Self {
            chunk_size: read_u32(bytes, 4),
            audio_format: read_u16(bytes, 20),
            channels: read_u16(bytes, 22),
            sample_rate: read_u32(bytes, 24),
            byte_rate: read_u32(bytes, 28),
            block_align: read_u16(bytes, 32),
            bits_per_sample: read_u16(bytes, 34),
            data_len: read_u32(bytes, 40),
        })
    }

    /// Number of frames in the payload
    pub fn frame_count(&self) -> u32 {
        if self.block_align == 0 {
            return 0;
        }
        self.data_len / self.block_align as u32
    }

    /// Playback duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.byte_rate == 0 {
            return 0.0;
        }
        self.data_len as f64 / self.byte_rate as f64
    }
}

fn expect_tag(bytes: &[u8], offset: usize, tag: &[u8; 4]) -> Result<()> {
    if &bytes[offset..offset + 4] != tag {
        return Err(WavrecError::malformed(format!(
            "expected '{}' at offset {}",
            String::from_utf8_lossy(tag),
            offset
        )));
    }
    Ok(())
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
