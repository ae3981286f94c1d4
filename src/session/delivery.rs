//! Delivery boundary
//!
//! Hands a finished WAVE file to the user under its generated name.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{Result, WavrecError};
use crate::wav::WaveFile;

/// Highest numeric suffix tried before giving up on a free filename
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Where and what was delivered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryReceipt {
    /// Delivery location (a filesystem path for directory delivery)
    pub location: String,
    /// Final filename, which may carry a collision suffix
    pub filename: String,
    /// File size in bytes
    pub size_bytes: usize,
    /// Hex SHA-256 of the delivered bytes
    pub sha256: String,
}

impl DeliveryReceipt {
    /// Build a receipt for `wave`, hashing its contents
    pub fn new(location: impl Into<String>, filename: impl Into<String>, wave: &WaveFile) -> Self {
        Self {
            location: location.into(),
            filename: filename.into(),
            size_bytes: wave.len(),
            sha256: sha256_hex(wave.as_bytes()),
        }
    }
}

/// Hex-encoded SHA-256 digest
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Exposes a finished recording to the user
pub trait FileDelivery: Send {
    fn deliver(&mut self, wave: &WaveFile, filename: &str) -> Result<DeliveryReceipt>;
}

/// Writes recordings into a directory
///
/// Existing files are never overwritten: a clashing name gets a `_1`,
/// `_2`, ... suffix before the extension.
#[derive(Debug, Clone)]
pub struct DirectoryDelivery {
    dir: PathBuf,
}

impl DirectoryDelivery {
    /// Deliver into `dir`, creating it on first use
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn candidate(&self, filename: &str, attempt: u32) -> (String, PathBuf) {
        let name = if attempt == 0 {
            filename.to_string()
        } else {
            let (stem, ext) = match filename.rsplit_once('.') {
                Some((stem, ext)) if !stem.is_empty() => (stem, format!(".{}", ext)),
                _ => (filename, String::new()),
            };
            format!("{}_{}{}", stem, attempt, ext)
        };
        let path = self.dir.join(&name);
        (name, path)
    }
}

impl FileDelivery for DirectoryDelivery {
    fn deliver(&mut self, wave: &WaveFile, filename: &str) -> Result<DeliveryReceipt> {
        fs::create_dir_all(&self.dir).map_err(|e| WavrecError::DeliveryError {
            path: self.dir.clone(),
            source: e,
        })?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let (name, path) = self.candidate(filename, attempt);

            // create_new makes the existence check and the create atomic
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(WavrecError::DeliveryError { path, source: e }),
            };

            let written = file.write_all(wave.as_bytes()).and_then(|_| file.sync_all());
            drop(file);
            discard_on_error(&path, written)?;

            log::info!("Delivered {} ({} bytes)", path.display(), wave.len());
            return Ok(DeliveryReceipt::new(
                path.display().to_string(),
                name,
                wave,
            ));
        }

        let (_, path) = self.candidate(filename, 0);
        Err(WavrecError::DeliveryError {
            path,
            source: std::io::Error::new(
                ErrorKind::AlreadyExists,
                format!("no free name after {} attempts", MAX_NAME_ATTEMPTS),
            ),
        })
    }
}

/// Remove a freshly created `path` when writing it failed
///
/// A truncated recording must not stay behind under the name the user
/// will look for.
fn discard_on_error(path: &Path, written: std::io::Result<()>) -> Result<()> {
    let Err(source) = written else {
        return Ok(());
    };

    if let Err(e) = fs::remove_file(path) {
        log::warn!("Could not remove partial file {}: {}", path.display(), e);
    }
    Err(WavrecError::DeliveryError {
        path: path.to_path_buf(),
        source,
    })
}

/// Keeps delivered recordings in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryDelivery {
    delivered: Vec<(String, WaveFile)>,
}

impl MemoryDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far, oldest first
    pub fn delivered(&self) -> &[(String, WaveFile)] {
        &self.delivered
    }
}

impl FileDelivery for MemoryDelivery {
    fn deliver(&mut self, wave: &WaveFile, filename: &str) -> Result<DeliveryReceipt> {
        self.delivered.push((filename.to_string(), wave.clone()));
        Ok(DeliveryReceipt::new(
            format!("memory:{}", self.delivered.len() - 1),
            filename,
            wave,
        ))
    }
}
