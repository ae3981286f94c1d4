//! Screen wake hold
//!
//! Keeps the display awake while a take is in progress. Acquisition is
//! best-effort: a lock that cannot be taken never blocks a recording.

use crate::error::Result;

/// A platform wake lock
pub trait WakeLock: Send {
    /// Take the lock
    fn acquire(&mut self) -> Result<()>;

    /// Drop the lock; releasing an unheld lock is a no-op
    fn release(&mut self);

    /// Whether the lock is currently held
    fn is_held(&self) -> bool;
}

/// Wake lock for platforms without a display to keep awake
#[derive(Debug, Clone, Default)]
pub struct NoopWakeLock {
    held: bool,
    acquisitions: u32,
}

impl NoopWakeLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times the lock has been acquired
    pub fn acquisitions(&self) -> u32 {
        self.acquisitions
    }
}

impl WakeLock for NoopWakeLock {
    fn acquire(&mut self) -> Result<()> {
        if !self.held {
            self.held = true;
            self.acquisitions += 1;
            log::debug!("Wake lock acquired");
        }
        Ok(())
    }

    fn release(&mut self) {
        if self.held {
            self.held = false;
            log::debug!("Wake lock released");
        }
    }

    fn is_held(&self) -> bool {
        self.held
    }
}
