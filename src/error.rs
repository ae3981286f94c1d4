//! Error handling for Wavrec
//!
//! Every error carries a stable code and, where it makes sense, recovery
//! suggestions that can be shown to the person holding the microphone.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Wavrec operations
pub type Result<T> = std::result::Result<T, WavrecError>;

/// Main error type for Wavrec operations
#[derive(Error, Debug)]
pub enum WavrecError {
    // Core Errors
    #[error("Malformed input: {reason}")]
    MalformedInput { reason: String },

    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    // Session Errors
    #[error("Cannot {action} while recorder is {state}")]
    InvalidTransition { state: String, action: String },

    #[error("Capture failed: {reason}")]
    CaptureError { reason: String },

    #[error("Decode failed: {reason}")]
    DecodeError {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Delivery failed: {path}")]
    DeliveryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Configuration Errors
    #[error("Invalid configuration in {path}: {reason}")]
    ConfigError { path: String, reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WavrecError {
    /// Shorthand for a malformed-input error
    pub fn malformed(reason: impl Into<String>) -> Self {
        WavrecError::MalformedInput {
            reason: reason.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            WavrecError::MalformedInput { .. } => "MALFORMED_INPUT",
            WavrecError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            WavrecError::InvalidTransition { .. } => "INVALID_TRANSITION",
            WavrecError::CaptureError { .. } => "CAPTURE_ERROR",
            WavrecError::DecodeError { .. } => "DECODE_ERROR",
            WavrecError::DeliveryError { .. } => "DELIVERY_ERROR",
            WavrecError::ConfigError { .. } => "CONFIG_ERROR",
            WavrecError::Io(_) => "IO_ERROR",
            WavrecError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable
    ///
    /// Malformed or undecodable recordings are never recoverable: the whole
    /// take is unusable and must be surfaced instead of partially encoded.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            WavrecError::InvalidTransition { .. }
                | WavrecError::DeliveryError { .. }
                | WavrecError::ConfigError { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            WavrecError::MalformedInput { .. } | WavrecError::DecodeError { .. } => vec![
                "The recording is unusable - record it again",
                "Check that the microphone is connected and not muted",
            ],
            WavrecError::UnsupportedFormat { .. } => vec![
                "Only 16-bit PCM output is supported",
                "Convert the source to WAV (8, 16, 24 or 32-bit) first",
            ],
            WavrecError::InvalidTransition { .. } => vec![
                "Start a recording before pausing or stopping it",
                "Enable pause support in the configuration to pause",
            ],
            WavrecError::CaptureError { .. } => vec![
                "Check microphone permissions",
                "Make sure the recording ran long enough to capture audio",
            ],
            WavrecError::DeliveryError { .. } => vec![
                "Check that the output directory exists and is writable",
                "Free up disk space",
            ],
            WavrecError::ConfigError { .. } => vec!["Fix the configuration value and retry"],
            _ => vec![],
        }
    }
}
