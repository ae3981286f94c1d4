//! Wavrec - Audio Recorder Core
//!
//! Wavrec records a take, then turns it into a canonical 16-bit PCM WAVE
//! file named after a user label and the time the take stopped.
//!
//! # Architecture
//!
//! The core is two pure transforms:
//! - Sample buffer assembly: per-channel decoded audio -> interleaved stream
//! - WAVE encoding: interleaved stream -> 44-byte header + 16-bit payload
//!
//! Around it, a recording session drives a capture source through
//! start/pause/resume/stop, and a pipeline with optional stages decodes,
//! encodes, names and delivers the result.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod session;
pub mod wav;

pub use config::RecorderConfig;
pub use engine::{interleave, DecodedAudio, InterleavedSamples};
pub use error::{Result, WavrecError};
pub use wav::{encode, WaveFile};
