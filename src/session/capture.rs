//! Capture boundary
//!
//! A capture source pushes opaque encoded chunks into a channel for the
//! lifetime of a take; the session drains the channel once on stop.

use std::fs;
use std::path::Path;
use std::sync::mpsc;

use crate::error::{Result, WavrecError};

/// One opaque chunk of captured, still-encoded audio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    pub data: Vec<u8>,
}

/// Producer half handed to a capture source
#[derive(Debug, Clone)]
pub struct ChunkSender {
    tx: mpsc::Sender<AudioChunk>,
}

impl ChunkSender {
    /// Push a chunk. Empty chunks are dropped.
    ///
    /// # Errors
    /// * `CaptureError` - the session has already been finalized
    pub fn send(&self, data: Vec<u8>) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        self.tx
            .send(AudioChunk { data })
            .map_err(|_| WavrecError::CaptureError {
                reason: "chunk arrived after the recording was finalized".to_string(),
            })
    }
}

/// Consumer half owned by the session
#[derive(Debug)]
pub struct ChunkReceiver {
    rx: mpsc::Receiver<AudioChunk>,
}

impl ChunkReceiver {
    /// Concatenate every chunk received so far, in arrival order
    ///
    /// Returns the joined bytes and the number of chunks.
    pub fn drain(&self) -> (Vec<u8>, usize) {
        let mut data = Vec::new();
        let mut count = 0;
        for chunk in self.rx.try_iter() {
            data.extend_from_slice(&chunk.data);
            count += 1;
        }
        (data, count)
    }
}

/// Create a connected chunk channel
pub fn chunk_channel() -> (ChunkSender, ChunkReceiver) {
    let (tx, rx) = mpsc::channel();
    (ChunkSender { tx }, ChunkReceiver { rx })
}

/// A microphone (or stand-in) producing encoded chunks
///
/// Implementations must have delivered every chunk to the sink by the time
/// `stop` returns, and should drop the sink then.
pub trait AudioCapture: Send {
    /// Begin capturing into `sink`
    fn start(&mut self, sink: ChunkSender) -> Result<()>;

    /// Suspend capture; nothing captured until `resume`
    fn pause(&mut self) -> Result<()>;

    /// Continue a paused capture
    fn resume(&mut self) -> Result<()>;

    /// Finish capture and flush pending chunks
    fn stop(&mut self) -> Result<()>;
}

/// Replays a pre-recorded file as if it were a live microphone
///
/// The whole source is emitted in `chunk_size` pieces when capture stops,
/// the way a recorder without a timeslice delivers a single take. Pauses
/// are accepted but have no effect on the replayed content.
#[derive(Debug)]
pub struct FileCapture {
    source: Vec<u8>,
    chunk_size: usize,
    sink: Option<ChunkSender>,
}

impl FileCapture {
    /// Capture from in-memory bytes
    pub fn from_bytes(source: Vec<u8>, chunk_size: usize) -> Self {
        Self {
            source,
            chunk_size: chunk_size.max(1),
            sink: None,
        }
    }

    /// Capture from a file on disk
    pub fn open(path: &Path, chunk_size: usize) -> Result<Self> {
        let source = fs::read(path).map_err(|e| WavrecError::CaptureError {
            reason: format!("cannot read capture source {}: {}", path.display(), e),
        })?;
        Ok(Self::from_bytes(source, chunk_size))
    }
}

impl AudioCapture for FileCapture {
    fn start(&mut self, sink: ChunkSender) -> Result<()> {
        if self.sink.is_some() {
            return Err(WavrecError::CaptureError {
                reason: "file capture already started".to_string(),
            });
        }
        log::debug!("File capture armed with {} bytes", self.source.len());
        self.sink = Some(sink);
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        log::debug!("File capture paused");
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        log::debug!("File capture resumed");
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let sink = self.sink.take().ok_or_else(|| WavrecError::CaptureError {
            reason: "file capture was never started".to_string(),
        })?;
        for chunk in self.source.chunks(self.chunk_size) {
            sink.send(chunk.to_vec())?;
        }
        Ok(())
    }
}
