//! Recording Session Module
//!
//! The collaborators around the encoder and the pipeline that drives them:
//! - Capture, decode and delivery boundaries
//! - Screen wake hold
//! - Filename templating
//! - Session lifecycle and the record-to-file pipeline

pub mod capture;
pub mod decode;
pub mod delivery;
pub mod naming;
pub mod pipeline;
pub mod wake_lock;

pub use capture::{chunk_channel, AudioCapture, AudioChunk, ChunkReceiver, ChunkSender, FileCapture};
pub use decode::AudioDecoder;
pub use delivery::{DeliveryReceipt, DirectoryDelivery, FileDelivery, MemoryDelivery};
pub use naming::{format_timestamp, sanitize_label, FilenameTemplate, DEFAULT_LABEL};
pub use pipeline::{CapturedRecording, RecordingPipeline, RecordingReport, RecordingSession};
pub use wake_lock::{NoopWakeLock, WakeLock};
