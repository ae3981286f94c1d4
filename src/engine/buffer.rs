//! Sample Buffer Assembly
//!
//! Holds decoded per-channel audio and turns it into the frame-major
//! interleaved stream the WAVE encoder consumes.

use crate::error::{Result, WavrecError};
use crate::wav::MAX_CHANNELS;

// ============================================================================
// Decoded Audio
// ============================================================================

/// Decoded multi-channel audio as handed over by the decode stage
///
/// One float sequence per channel, all sharing `sample_rate`. Values are
/// nominally in `[-1.0, 1.0]` but are not required to be.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Per-channel samples, channel 0 first
    pub channels: Vec<Vec<f32>>,
    /// Samples per second per channel
    pub sample_rate: u32,
}

impl DecodedAudio {
    /// Create decoded audio, rejecting empty or ragged channel data
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        let decoded = Self {
            channels,
            sample_rate,
        };
        decoded.validate()?;
        Ok(decoded)
    }

    /// Check the invariants: at least one channel, all channels equal length,
    /// positive sample rate and a channel count that fits the WAVE header
    pub fn validate(&self) -> Result<()> {
        if self.channels.is_empty() {
            return Err(WavrecError::malformed("decoded audio has no channels"));
        }
        if self.channels.len() > MAX_CHANNELS as usize {
            return Err(WavrecError::malformed(format!(
                "{} channels exceeds the WAVE limit of {}",
                self.channels.len(),
                MAX_CHANNELS
            )));
        }
        if self.sample_rate == 0 {
            return Err(WavrecError::malformed("sample rate must be positive"));
        }

        let frames = self.channels[0].len();
        if let Some((index, channel)) = self
            .channels
            .iter()
            .enumerate()
            .find(|(_, channel)| channel.len() != frames)
        {
            return Err(WavrecError::malformed(format!(
                "channel {} has {} frames, expected {}",
                index,
                channel.len(),
                frames
            )));
        }

        Ok(())
    }

    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames (samples per channel)
    pub fn frame_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / self.sample_rate as f64
    }

    /// Get samples for a specific channel
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }
}

// ============================================================================
// Interleaved Samples
// ============================================================================

/// Frame-major interleaved samples: `[c0f0, c1f0, c0f1, c1f1, ...]`
///
/// The sample count is always a whole number of frames.
#[derive(Debug, Clone, PartialEq)]
pub struct InterleavedSamples {
    samples: Vec<f32>,
    channel_count: u16,
}

impl InterleavedSamples {
    /// Wrap an already interleaved stream
    pub fn new(samples: Vec<f32>, channel_count: u16) -> Result<Self> {
        if channel_count == 0 {
            return Err(WavrecError::malformed("channel count must be at least 1"));
        }
        if channel_count > MAX_CHANNELS {
            return Err(WavrecError::malformed(format!(
                "{} channels exceeds the WAVE limit of {}",
                channel_count, MAX_CHANNELS
            )));
        }
        if samples.len() % channel_count as usize != 0 {
            return Err(WavrecError::malformed(format!(
                "sample count {} is not divisible by channel count {}",
                samples.len(),
                channel_count
            )));
        }
        Ok(Self {
            samples,
            channel_count,
        })
    }

    /// The interleaved samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of interleaved channels
    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    /// Number of frames
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channel_count as usize
    }

    /// Total number of samples across all channels
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when there are no frames
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample for `channel` at `frame`
    pub fn get(&self, frame: usize, channel: usize) -> Option<f32> {
        if channel >= self.channel_count as usize {
            return None;
        }
        self.samples
            .get(frame * self.channel_count as usize + channel)
            .copied()
    }

    /// Split back into per-channel sequences
    pub fn to_decoded(&self, sample_rate: u32) -> Result<DecodedAudio> {
        DecodedAudio::new(
            deinterleave(&self.samples, self.channel_count as usize),
            sample_rate,
        )
    }

    /// Consume and return the raw sample vector
    pub fn into_vec(self) -> Vec<f32> {
        self.samples
    }
}

/// Interleave decoded channels into a single frame-major stream
///
/// Element `frame * channel_count + channel` of the result equals
/// `decoded.channels[channel][frame]`. Out-of-range values pass through
/// untouched; clipping happens in the encoder.
///
/// # Errors
/// * `MalformedInput` - no channels, or channels of differing lengths
pub fn interleave(decoded: &DecodedAudio) -> Result<InterleavedSamples> {
    decoded.validate()?;

    let num_channels = decoded.channel_count();
    let frames = decoded.frame_count();
    let mut result = Vec::with_capacity(frames * num_channels);

    for frame in 0..frames {
        for channel in &decoded.channels {
            result.push(channel[frame]);
        }
    }

    log::debug!(
        "Interleaved {} frames x {} channels",
        frames,
        num_channels
    );

    InterleavedSamples::new(result, num_channels as u16)
}

/// De-interleave samples from [L,R,L,R,...] to [[L,L,...], [R,R,...]]
///
/// A trailing partial frame is dropped.
pub fn deinterleave(samples: &[f32], channels: usize) -> Vec<Vec<f32>> {
    if channels == 0 {
        return Vec::new();
    }

    let frames = samples.len() / channels;
    let mut result = vec![Vec::with_capacity(frames); channels];

    for (i, sample) in samples.iter().take(frames * channels).enumerate() {
        result[i % channels].push(*sample);
    }

    result
}

// ============================================================================
// Test Signals
// ============================================================================

/// Generate a sine test tone, identical on every channel
///
/// # Arguments
/// * `frequency` - Frequency of the sine wave in Hz
/// * `duration_secs` - Duration of the tone in seconds
/// * `sample_rate` - Sample rate in Hz
/// * `channels` - Number of channels to fill
/// * `amplitude` - Peak amplitude (1.0 = full scale)
pub fn generate_test_tone(
    frequency: f32,
    duration_secs: f32,
    sample_rate: u32,
    channels: usize,
    amplitude: f32,
) -> Result<DecodedAudio> {
    let num_frames = (duration_secs * sample_rate as f32) as usize;
    let angular_freq = 2.0 * std::f32::consts::PI * frequency / sample_rate as f32;

    let tone: Vec<f32> = (0..num_frames)
        .map(|i| amplitude * (angular_freq * i as f32).sin())
        .collect();

    DecodedAudio::new(vec![tone; channels], sample_rate)
}

// ============================================================================
// Tests
// ============================================================================
