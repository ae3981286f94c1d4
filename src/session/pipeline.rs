//! Record-and-encode pipeline
//!
//! `RecordingSession` owns one capture source and walks it through the
//! transport states; `stop` hands back a `CapturedRecording` that owns the
//! drained bytes. `RecordingPipeline::finish` then consumes that recording:
//! decode, optional resample, interleave, encode, name, deliver.

use chrono::{DateTime, Local};
use serde::Serialize;
use uuid::Uuid;

use crate::config::RecorderConfig;
use crate::engine::buffer::interleave;
use crate::engine::io::resample;
use crate::engine::transport::{RecorderState, RecorderTransport};
use crate::error::{Result, WavrecError};
use crate::session::capture::{chunk_channel, AudioCapture, ChunkReceiver};
use crate::session::decode::AudioDecoder;
use crate::session::delivery::{DeliveryReceipt, FileDelivery};
use crate::session::naming::FilenameTemplate;
use crate::session::wake_lock::WakeLock;
use crate::wav::{encode, WaveFile};

/// Everything a finished take captured
#[derive(Debug, Clone)]
pub struct CapturedRecording {
    pub session_id: Uuid,
    /// Concatenated capture chunks, still in the capture encoding
    pub data: Vec<u8>,
    pub chunk_count: usize,
    pub pause_count: u32,
    pub started_at: DateTime<Local>,
    pub stopped_at: DateTime<Local>,
}

/// One take from start to stop
pub struct RecordingSession {
    id: Uuid,
    capture: Box<dyn AudioCapture>,
    transport: RecorderTransport,
    receiver: Option<ChunkReceiver>,
    wake_lock: Option<Box<dyn WakeLock>>,
    started_at: Option<DateTime<Local>>,
}

impl RecordingSession {
    /// Create an inactive session around `capture`
    pub fn new(capture: Box<dyn AudioCapture>, allow_pause: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            capture,
            transport: RecorderTransport::new(allow_pause),
            receiver: None,
            wake_lock: None,
            started_at: None,
        }
    }

    /// Hold `lock` for as long as a take is in progress
    pub fn with_wake_lock(mut self, lock: Box<dyn WakeLock>) -> Self {
        self.wake_lock = Some(lock);
        self
    }

    /// Session id, also carried by every recording it produces
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current transport state
    pub fn state(&self) -> RecorderState {
        self.transport.state()
    }

    /// Whether the wake lock (if any) is held
    pub fn holds_wake_lock(&self) -> bool {
        self.wake_lock.as_ref().is_some_and(|lock| lock.is_held())
    }

    /// Start a take
    pub fn start(&mut self) -> Result<()> {
        self.transport.start()?;

        let (sender, receiver) = chunk_channel();
        if let Err(e) = self.capture.start(sender) {
            // Roll back so the session can be started again
            self.transport.stop()?;
            return Err(e);
        }

        self.receiver = Some(receiver);
        self.started_at = Some(Local::now());

        if let Some(lock) = self.wake_lock.as_mut() {
            if let Err(e) = lock.acquire() {
                log::warn!("Could not keep the display awake: {}", e);
            }
        }

        log::info!("Session {} recording", self.id);
        Ok(())
    }

    /// Suspend the take
    pub fn pause(&mut self) -> Result<()> {
        let was_recording = self.transport.is_recording();
        self.transport.pause()?;
        if was_recording {
            self.capture.pause()?;
        }
        Ok(())
    }

    /// Continue a paused take
    pub fn resume(&mut self) -> Result<()> {
        let was_paused = self.transport.is_paused();
        self.transport.resume()?;
        if was_paused {
            self.capture.resume()?;
        }
        Ok(())
    }

    /// Pause when recording, resume when paused; returns the new state
    pub fn toggle_pause(&mut self) -> Result<RecorderState> {
        match self.transport.state() {
            RecorderState::Recording => self.pause()?,
            RecorderState::Paused => self.resume()?,
            RecorderState::Inactive => {
                return Err(WavrecError::InvalidTransition {
                    state: RecorderState::Inactive.to_string(),
                    action: "pause".to_string(),
                })
            }
        }
        Ok(self.transport.state())
    }

    /// End the take and collect everything captured
    ///
    /// # Errors
    /// * `InvalidTransition` - no take in progress
    /// * `CaptureError` - the capture failed to stop, or captured nothing
    pub fn stop(&mut self) -> Result<CapturedRecording> {
        self.transport.stop()?;

        let stopped = self.capture.stop();
        let stopped_at = Local::now();
        self.release_wake_lock();
        let receiver = self.receiver.take();
        stopped?;

        let (data, chunk_count) = receiver.map(|rx| rx.drain()).unwrap_or_default();
        if data.is_empty() {
            return Err(WavrecError::CaptureError {
                reason: "no audio was captured".to_string(),
            });
        }

        log::info!(
            "Session {} stopped: {} bytes in {} chunk(s)",
            self.id,
            data.len(),
            chunk_count
        );

        Ok(CapturedRecording {
            session_id: self.id,
            data,
            chunk_count,
            pause_count: self.transport.pause_count(),
            started_at: self.started_at.take().unwrap_or(stopped_at),
            stopped_at,
        })
    }

    fn release_wake_lock(&mut self) {
        if let Some(lock) = self.wake_lock.as_mut() {
            lock.release();
        }
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        self.release_wake_lock();
    }
}

/// Summary of a delivered recording
#[derive(Debug, Clone, Serialize)]
pub struct RecordingReport {
    pub session_id: Uuid,
    pub channels: u16,
    pub sample_rate: u32,
    pub frame_count: usize,
    pub duration_secs: f64,
    pub pause_count: u32,
    pub stopped_at: DateTime<Local>,
    pub delivery: DeliveryReceipt,
}

/// Decode, encode and deliver finished takes
pub struct RecordingPipeline {
    decoder: Box<dyn AudioDecoder>,
    delivery: Box<dyn FileDelivery>,
    naming: FilenameTemplate,
    target_sample_rate: Option<u32>,
}

impl RecordingPipeline {
    /// Build a pipeline with the stages `config` enables
    pub fn new(
        decoder: Box<dyn AudioDecoder>,
        delivery: Box<dyn FileDelivery>,
        config: &RecorderConfig,
    ) -> Self {
        Self {
            decoder,
            delivery,
            naming: FilenameTemplate::new(config.labeled_filenames, &config.default_label),
            target_sample_rate: config.target_sample_rate,
        }
    }

    /// Open a session with the stages `config` enables
    pub fn session(
        capture: Box<dyn AudioCapture>,
        wake_lock: Option<Box<dyn WakeLock>>,
        config: &RecorderConfig,
    ) -> RecordingSession {
        let session = RecordingSession::new(capture, config.allow_pause);
        match wake_lock {
            Some(lock) if config.hold_wake_lock => session.with_wake_lock(lock),
            _ => session,
        }
    }

    /// Turn captured bytes into a WAVE file
    pub fn encode_captured(&self, captured: &CapturedRecording) -> Result<WaveFile> {
        let mut decoded = self.decoder.decode(&captured.data)?;
        if let Some(rate) = self.target_sample_rate {
            decoded = resample(decoded, rate)?;
        }

        let interleaved = interleave(&decoded)?;
        encode(&interleaved, decoded.sample_rate)
    }

    /// Encode and deliver `captured` under a name built from `label`
    pub fn finish(&mut self, captured: CapturedRecording, label: &str) -> Result<RecordingReport> {
        let wave = self.encode_captured(&captured)?;
        let header = wave.header()?;

        let filename = self.naming.render(label, &captured.stopped_at.naive_local());
        let delivery = self.delivery.deliver(&wave, &filename)?;

        Ok(RecordingReport {
            session_id: captured.session_id,
            channels: header.channels,
            sample_rate: header.sample_rate,
            frame_count: header.frame_count() as usize,
            duration_secs: header.duration_secs(),
            pause_count: captured.pause_count,
            stopped_at: captured.stopped_at,
            delivery,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::io::HoundDecoder;
    use crate::session::capture::ChunkSender;
    use crate::session::delivery::MemoryDelivery;
    use crate::session::wake_lock::NoopWakeLock;
    use std::sync::{Arc, Mutex};

    /// Emits one chunk per call while recording, split on pause/stop
    struct ScriptedCapture {
        chunks: Vec<Vec<u8>>,
        sink: Option<ChunkSender>,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl ScriptedCapture {
        fn new(chunks: Vec<Vec<u8>>) -> (Self, Arc<Mutex<Vec<&'static str>>>) {
            let log = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    chunks,
                    sink: None,
                    log: Arc::clone(&log),
                },
                log,
            )
        }

        fn flush_one(&mut self) -> Result<()> {
            if let (Some(sink), false) = (&self.sink, self.chunks.is_empty()) {
                sink.send(self.chunks.remove(0))?;
            }
            Ok(())
        }
    }

    impl AudioCapture for ScriptedCapture {
        fn start(&mut self, sink: ChunkSender) -> Result<()> {
            self.log.lock().unwrap().push("start");
            self.sink = Some(sink);
            Ok(())
        }
        fn pause(&mut self) -> Result<()> {
            self.log.lock().unwrap().push("pause");
            self.flush_one()
        }
        fn resume(&mut self) -> Result<()> {
            self.log.lock().unwrap().push("resume");
            Ok(())
        }
        fn stop(&mut self) -> Result<()> {
            self.log.lock().unwrap().push("stop");
            while !self.chunks.is_empty() {
                self.flush_one()?;
            }
            self.sink = None;
            Ok(())
        }
    }

    struct FailingCapture;

    impl AudioCapture for FailingCapture {
        fn start(&mut self, _sink: ChunkSender) -> Result<()> {
            Err(WavrecError::CaptureError {
                reason: "permission denied".to_string(),
            })
        }
        fn pause(&mut self) -> Result<()> {
            Ok(())
        }
        fn resume(&mut self) -> Result<()> {
            Ok(())
        }
        fn stop(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_session_collects_chunks_in_order() {
        let (capture, log) = ScriptedCapture::new(vec![vec![1, 2], vec![3], vec![4, 5]]);
        let mut session = RecordingSession::new(Box::new(capture), true);

        session.start().unwrap();
        session.pause().unwrap();
        session.resume().unwrap();
        let captured = session.stop().unwrap();

        assert_eq!(captured.data, vec![1, 2, 3, 4, 5]);
        assert_eq!(captured.chunk_count, 3);
        assert_eq!(captured.pause_count, 1);
        assert_eq!(captured.session_id, session.id());
        assert!(captured.stopped_at >= captured.started_at);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["start", "pause", "resume", "stop"]
        );
    }

    #[test]
    fn test_repeated_pause_reaches_capture_once() {
        let (capture, log) = ScriptedCapture::new(vec![vec![1]]);
        let mut session = RecordingSession::new(Box::new(capture), true);

        session.start().unwrap();
        session.pause().unwrap();
        session.pause().unwrap();
        assert_eq!(session.toggle_pause().unwrap(), RecorderState::Recording);
        session.stop().unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["start", "pause", "resume", "stop"]
        );
    }

    #[test]
    fn test_pause_disabled_session() {
        let (capture, _) = ScriptedCapture::new(vec![vec![1]]);
        let mut session = RecordingSession::new(Box::new(capture), false);
        session.start().unwrap();
        assert_eq!(
            session.pause().unwrap_err().error_code(),
            "INVALID_TRANSITION"
        );
        assert_eq!(session.state(), RecorderState::Recording);
    }

    #[test]
    fn test_stop_without_start() {
        let (capture, _) = ScriptedCapture::new(vec![vec![1]]);
        let mut session = RecordingSession::new(Box::new(capture), true);
        assert!(session.stop().is_err());
        assert!(session.toggle_pause().is_err());
    }

    #[test]
    fn test_empty_capture_is_error() {
        let (capture, _) = ScriptedCapture::new(vec![]);
        let mut session = RecordingSession::new(Box::new(capture), true);
        session.start().unwrap();
        let err = session.stop().unwrap_err();
        assert_eq!(err.error_code(), "CAPTURE_ERROR");
        assert_eq!(session.state(), RecorderState::Inactive);
    }

    #[test]
    fn test_failed_capture_start_rolls_back() {
        let mut session = RecordingSession::new(Box::new(FailingCapture), true)
            .with_wake_lock(Box::new(NoopWakeLock::new()));
        assert!(session.start().is_err());
        assert_eq!(session.state(), RecorderState::Inactive);
        assert!(!session.holds_wake_lock());
    }

    #[test]
    fn test_wake_lock_held_during_take() {
        let (capture, _) = ScriptedCapture::new(vec![vec![1]]);
        let mut session = RecordingSession::new(Box::new(capture), true)
            .with_wake_lock(Box::new(NoopWakeLock::new()));

        assert!(!session.holds_wake_lock());
        session.start().unwrap();
        assert!(session.holds_wake_lock());
        session.pause().unwrap();
        assert!(session.holds_wake_lock());
        session.stop().unwrap();
        assert!(!session.holds_wake_lock());
    }

    #[test]
    fn test_session_factory_respects_wake_lock_flag() {
        let config = RecorderConfig {
            hold_wake_lock: false,
            ..RecorderConfig::default()
        };
        let (capture, _) = ScriptedCapture::new(vec![vec![1]]);
        let mut session = RecordingPipeline::session(
            Box::new(capture),
            Some(Box::new(NoopWakeLock::new())),
            &config,
        );
        session.start().unwrap();
        assert!(!session.holds_wake_lock());
    }

    #[test]
    fn test_pipeline_rejects_undecodable_capture() {
        let (capture, _) = ScriptedCapture::new(vec![b"webm?".to_vec()]);
        let mut session = RecordingSession::new(Box::new(capture), true);
        session.start().unwrap();
        let captured = session.stop().unwrap();

        let delivery = MemoryDelivery::new();
        let mut pipeline = RecordingPipeline::new(
            Box::new(HoundDecoder::new()),
            Box::new(delivery),
            &RecorderConfig::default(),
        );
        let err = pipeline.finish(captured, "x").unwrap_err();
        assert_eq!(err.error_code(), "DECODE_ERROR");
    }
}
