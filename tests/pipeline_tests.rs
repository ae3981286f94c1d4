//! Pipeline Integration Tests
//!
//! Capture -> decode -> interleave -> encode -> name -> deliver, end to end.

use std::fs;

use wavrec::engine::{generate_test_tone, interleave, HoundDecoder};
use wavrec::session::{
    AudioCapture, ChunkSender, DirectoryDelivery, FileCapture, MemoryDelivery, NoopWakeLock,
    RecordingPipeline, RecordingSession,
};
use wavrec::wav::{encode, WavHeader};
use wavrec::{RecorderConfig, Result};

/// A source WAV file as the capture stand-in would deliver it
fn source_wav(channels: usize, sample_rate: u32, secs: f32) -> Vec<u8> {
    let tone = generate_test_tone(440.0, secs, sample_rate, channels, 0.5).unwrap();
    encode(&interleave(&tone).unwrap(), sample_rate)
        .unwrap()
        .into_bytes()
}

/// Streams its source while recording, holding back whatever would arrive while paused
struct StreamingCapture {
    source: Vec<u8>,
    cursor: usize,
    step: usize,
    sink: Option<ChunkSender>,
}

impl StreamingCapture {
    fn new(source: Vec<u8>, step: usize) -> Self {
        Self {
            source,
            cursor: 0,
            step,
            sink: None,
        }
    }

    fn emit(&mut self, n: usize) -> Result<()> {
        let end = (self.cursor + n).min(self.source.len());
        if let Some(sink) = &self.sink {
            sink.send(self.source[self.cursor..end].to_vec())?;
        }
        self.cursor = end;
        Ok(())
    }
}

impl AudioCapture for StreamingCapture {
    fn start(&mut self, sink: ChunkSender) -> Result<()> {
        self.sink = Some(sink);
        self.emit(self.step)
    }

    fn pause(&mut self) -> Result<()> {
        self.emit(self.step)
    }

    fn resume(&mut self) -> Result<()> {
        self.emit(self.step)
    }

    fn stop(&mut self) -> Result<()> {
        let rest = self.source.len() - self.cursor;
        self.emit(rest)?;
        self.sink = None;
        Ok(())
    }
}

#[test]
fn full_pipeline_with_pauses_delivers_wav() {
    let source = source_wav(2, 44100, 0.25);
    let config = RecorderConfig::default();

    let mut session = RecordingPipeline::session(
        Box::new(StreamingCapture::new(source.clone(), 997)),
        Some(Box::new(NoopWakeLock::new())),
        &config,
    );
    session.start().unwrap();
    assert!(session.holds_wake_lock());
    session.toggle_pause().unwrap();
    session.toggle_pause().unwrap();
    session.pause().unwrap();
    session.resume().unwrap();
    let captured = session.stop().unwrap();
    assert!(!session.holds_wake_lock());

    assert_eq!(captured.data, source);
    assert_eq!(captured.pause_count, 2);

    let mut pipeline = RecordingPipeline::new(
        Box::new(HoundDecoder::new()),
        Box::new(MemoryDelivery::new()),
        &config,
    );
    let report = pipeline.finish(captured, "  Dr. Who ").unwrap();

    assert!(report.delivery.filename.starts_with("Dr. Who_"));
    assert!(report.delivery.filename.ends_with(".wav"));
    assert!(report.delivery.filename.contains("_TIME"));
    assert_eq!(report.channels, 2);
    assert_eq!(report.sample_rate, 44100);
    assert_eq!(report.pause_count, 2);
    // Same format in and out, so the same number of bytes
    assert_eq!(report.delivery.size_bytes, source.len());
}

#[test]
fn pipeline_resamples_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let config = RecorderConfig {
        target_sample_rate: Some(16000),
        labeled_filenames: false,
        output_dir: dir.path().to_path_buf(),
        ..RecorderConfig::default()
    };

    let mut session = RecordingPipeline::session(
        Box::new(FileCapture::from_bytes(source_wav(1, 48000, 0.5), 4096)),
        None,
        &config,
    );
    session.start().unwrap();
    let captured = session.stop().unwrap();

    let mut pipeline = RecordingPipeline::new(
        Box::new(HoundDecoder::new()),
        Box::new(DirectoryDelivery::new(config.output_dir.clone())),
        &config,
    );
    let report = pipeline.finish(captured, "ignored").unwrap();

    assert!(!report.delivery.filename.contains("ignored"));
    assert!(report.delivery.filename.contains("_TIME"));

    let written = fs::read(&report.delivery.location).unwrap();
    let header = WavHeader::parse(&written).unwrap();
    assert_eq!(header.sample_rate, 16000);
    assert_eq!(header.channels, 1);
    assert_eq!(header.byte_rate, 32000);
    assert_eq!(header.data_len as usize, written.len() - 44);
    assert!((header.frame_count() as i64 - 8000).abs() <= 1);
}

#[test]
fn session_can_record_again_after_stop() {
    let source = source_wav(1, 8000, 0.1);
    let mut session = RecordingSession::new(
        Box::new(StreamingCapture::new(source.clone(), 100)),
        false,
    );

    session.start().unwrap();
    let first = session.stop().unwrap();
    assert_eq!(first.data, source);

    // The capture is exhausted, so a second take captures nothing
    session.start().unwrap();
    let err = session.stop().unwrap_err();
    assert_eq!(err.error_code(), "CAPTURE_ERROR");
}

#[test]
fn blank_label_uses_configured_default() {
    let config = RecorderConfig {
        default_label: "Patient".to_string(),
        ..RecorderConfig::default()
    };

    let mut session = RecordingPipeline::session(
        Box::new(FileCapture::from_bytes(source_wav(1, 8000, 0.1), 64)),
        None,
        &config,
    );
    session.start().unwrap();
    let captured = session.stop().unwrap();

    let mut pipeline = RecordingPipeline::new(
        Box::new(HoundDecoder::new()),
        Box::new(MemoryDelivery::new()),
        &config,
    );
    let report = pipeline.finish(captured, "   ").unwrap();
    assert!(report.delivery.filename.starts_with("Patient_"));
}
