//! Decode boundary
//!
//! Turns the concatenated capture bytes into per-channel float audio.

use crate::engine::buffer::DecodedAudio;
use crate::engine::io::HoundDecoder;
use crate::error::Result;

/// Decodes a captured byte stream into `DecodedAudio`
pub trait AudioDecoder: Send {
    fn decode(&self, data: &[u8]) -> Result<DecodedAudio>;
}

impl AudioDecoder for HoundDecoder {
    fn decode(&self, data: &[u8]) -> Result<DecodedAudio> {
        self.decode_bytes(data)
    }
}
