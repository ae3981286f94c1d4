//! WAVE Container Module
//!
//! Canonical 16-bit PCM WAVE serialization:
//! - Format description and 44-byte header layout
//! - Sample quantization and the encoder

pub mod encoder;
pub mod format;

pub use encoder::{dequantize_sample, encode, encode_with_format, quantize_sample, WaveFile};
pub use format::{WavFormat, WavHeader, BITS_PER_SAMPLE, HEADER_LEN, MAX_CHANNELS};
