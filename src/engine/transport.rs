//! Recorder Transport State Machine
//!
//! Tracks where a recording session is in its lifecycle:
//!
//! ```text
//! Inactive --start--> Recording <--pause/resume--> Paused
//!     ^                   |                          |
//!     +-------stop--------+----------stop------------+
//! ```
//!
//! Pause support is optional; when disabled, pause and resume are rejected.

use std::fmt;

use crate::error::{Result, WavrecError};

/// Recorder states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecorderState {
    /// No recording in progress (default state)
    #[default]
    Inactive,
    /// Audio is being captured
    Recording,
    /// Capture is suspended; the take continues on resume
    Paused,
}

impl fmt::Display for RecorderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecorderState::Inactive => write!(f, "inactive"),
            RecorderState::Recording => write!(f, "recording"),
            RecorderState::Paused => write!(f, "paused"),
        }
    }
}

/// Drives recorder state transitions
#[derive(Debug, Clone)]
pub struct RecorderTransport {
    /// Current state
    state: RecorderState,

    /// Whether pause/resume is offered at all
    allow_pause: bool,

    /// Number of pauses in the current take
    pause_count: u32,
}

impl Default for RecorderTransport {
    fn default() -> Self {
        Self::new(true)
    }
}

impl RecorderTransport {
    /// Create a transport in the `Inactive` state
    ///
    /// # Example
    /// ```
    /// use wavrec::engine::RecorderTransport;
    /// let transport = RecorderTransport::new(true);
    /// assert!(transport.is_inactive());
    /// ```
    pub fn new(allow_pause: bool) -> Self {
        Self {
            state: RecorderState::Inactive,
            allow_pause,
            pause_count: 0,
        }
    }

    /// Begin a new take
    ///
    /// State transition: Inactive -> Recording
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            RecorderState::Inactive => {
                self.state = RecorderState::Recording;
                self.pause_count = 0;
                log::debug!("[TRANSPORT] Recording started");
                Ok(())
            }
            _ => Err(self.invalid("start")),
        }
    }

    /// Suspend capture
    ///
    /// State transitions:
    /// - Recording -> Paused
    /// - Paused -> Paused (no-op)
    pub fn pause(&mut self) -> Result<()> {
        self.require_pause_support("pause")?;
        match self.state {
            RecorderState::Recording => {
                self.state = RecorderState::Paused;
                self.pause_count += 1;
                log::debug!("[TRANSPORT] Paused (pause #{})", self.pause_count);
                Ok(())
            }
            RecorderState::Paused => {
                log::warn!("[TRANSPORT] Already paused");
                Ok(())
            }
            RecorderState::Inactive => Err(self.invalid("pause")),
        }
    }

    /// Continue capture after a pause
    ///
    /// State transitions:
    /// - Paused -> Recording
    /// - Recording -> Recording (no-op)
    pub fn resume(&mut self) -> Result<()> {
        self.require_pause_support("resume")?;
        match self.state {
            RecorderState::Paused => {
                self.state = RecorderState::Recording;
                log::debug!("[TRANSPORT] Resumed");
                Ok(())
            }
            RecorderState::Recording => {
                log::warn!("[TRANSPORT] Already recording");
                Ok(())
            }
            RecorderState::Inactive => Err(self.invalid("resume")),
        }
    }

    /// Pause when recording, resume when paused
    ///
    /// Returns the state after the toggle.
    ///
    /// # Example
    /// ```
    /// use wavrec::engine::{RecorderState, RecorderTransport};
    /// let mut transport = RecorderTransport::new(true);
    /// transport.start().unwrap();
    /// assert_eq!(transport.toggle_pause().unwrap(), RecorderState::Paused);
    /// assert_eq!(transport.toggle_pause().unwrap(), RecorderState::Recording);
    /// ```
    pub fn toggle_pause(&mut self) -> Result<RecorderState> {
        match self.state {
            RecorderState::Recording => self.pause()?,
            RecorderState::Paused => self.resume()?,
            RecorderState::Inactive => return Err(self.invalid("pause")),
        }
        Ok(self.state)
    }

    /// End the take
    ///
    /// State transitions: Recording | Paused -> Inactive
    pub fn stop(&mut self) -> Result<()> {
        match self.state {
            RecorderState::Recording | RecorderState::Paused => {
                log::debug!(
                    "[TRANSPORT] Stopped from {} after {} pause(s)",
                    self.state,
                    self.pause_count
                );
                self.state = RecorderState::Inactive;
                Ok(())
            }
            RecorderState::Inactive => Err(self.invalid("stop")),
        }
    }

    // ========================================================================
    // State Queries
    // ========================================================================

    /// Check if audio is being captured
    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    /// Check if the take is paused
    pub fn is_paused(&self) -> bool {
        self.state == RecorderState::Paused
    }

    /// Check if no take is in progress
    pub fn is_inactive(&self) -> bool {
        self.state == RecorderState::Inactive
    }

    /// Get the current state
    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Whether pause/resume is enabled
    pub fn allows_pause(&self) -> bool {
        self.allow_pause
    }

    /// Number of pauses in the current (or last) take
    pub fn pause_count(&self) -> u32 {
        self.pause_count
    }

    fn require_pause_support(&self, action: &str) -> Result<()> {
        if self.allow_pause {
            Ok(())
        } else {
            Err(WavrecError::InvalidTransition {
                state: format!("{} (pause disabled)", self.state),
                action: action.to_string(),
            })
        }
    }

    fn invalid(&self, action: &str) -> WavrecError {
        WavrecError::InvalidTransition {
            state: self.state.to_string(),
            action: action.to_string(),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
