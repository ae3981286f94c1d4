//! Audio Engine Module
//!
//! Core audio handling including:
//! - Decoded and interleaved sample buffers
//! - Recorder transport state machine
//! - WAVE decoding, resampling and file output

pub mod buffer;
pub mod io;
pub mod transport;

pub use buffer::{deinterleave, generate_test_tone, interleave, DecodedAudio, InterleavedSamples};
pub use io::{resample, write_wave_file, HoundDecoder};
pub use transport::{RecorderState, RecorderTransport};
