//! Recorder configuration
//!
//! Loaded from a JSON file; every field is optional and falls back to the
//! defaults below.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WavrecError};
use crate::session::naming::DEFAULT_LABEL;

/// Default size of the pieces a file capture is split into
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Which pipeline stages are enabled, and where output goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Label used when none is entered
    pub default_label: String,

    /// Directory recordings are delivered to
    pub output_dir: PathBuf,

    /// Offer pause/resume during a take
    pub allow_pause: bool,

    /// Put the label in the filename
    pub labeled_filenames: bool,

    /// Keep the display awake while recording
    pub hold_wake_lock: bool,

    /// Resample decoded audio to this rate before encoding
    pub target_sample_rate: Option<u32>,

    /// Chunk size for file-backed capture, in bytes
    pub capture_chunk_size: usize,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            default_label: DEFAULT_LABEL.to_string(),
            output_dir: PathBuf::from("."),
            allow_pause: true,
            labeled_filenames: true,
            hold_wake_lock: true,
            target_sample_rate: None,
            capture_chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl RecorderConfig {
    /// Load and validate a JSON configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate(&path.display().to_string())?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Check values that serde cannot
    ///
    /// `origin` names where the configuration came from, for error messages.
    pub fn validate(&self, origin: &str) -> Result<()> {
        if self.capture_chunk_size == 0 {
            return Err(WavrecError::ConfigError {
                path: origin.to_string(),
                reason: "capture_chunk_size must be at least 1".to_string(),
            });
        }
        if self.target_sample_rate == Some(0) {
            return Err(WavrecError::ConfigError {
                path: origin.to_string(),
                reason: "target_sample_rate must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = RecorderConfig::default();
        assert_eq!(config.default_label, "Unnamed");
        assert!(config.allow_pause);
        assert!(config.labeled_filenames);
        assert_eq!(config.target_sample_rate, None);
        assert!(config.validate("default").is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wavrec.json");
        fs::write(&path, r#"{ "allow_pause": false, "target_sample_rate": 44100 }"#).unwrap();

        let config = RecorderConfig::load(&path).unwrap();
        assert_eq!(
            config,
            RecorderConfig {
                allow_pause: false,
                target_sample_rate: Some(44100),
                ..RecorderConfig::default()
            }
        );
    }

    #[test]
    fn test_json_round_trip() {
        let config = RecorderConfig {
            default_label: "Patient".to_string(),
            hold_wake_lock: false,
            ..RecorderConfig::default()
        };
        let parsed: RecorderConfig = serde_json::from_str(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{ "capture_chunk_size": 0 }"#).unwrap();

        let err = RecorderConfig::load(&path).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");

        let config = RecorderConfig {
            target_sample_rate: Some(0),
            ..RecorderConfig::default()
        };
        assert!(config.validate("inline").is_err());
    }

    #[test]
    fn test_malformed_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(
            RecorderConfig::load(&path).unwrap_err().error_code(),
            "SERIALIZATION_ERROR"
        );
    }
}
