//! File I/O Module
//!
//! Reads slicer G-code programs into memory. The conversion is a batch
//! transform, so the whole file is loaded at once; very large files are
//! reported but not rejected.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

/// Files above this size trigger a warning (256 MB)
const LARGE_FILE_BYTES: u64 = 256 * 1024 * 1024;

/// G-code file reader
pub struct GcodeFileReader {
    path: PathBuf,
    file_size: u64,
}

impl GcodeFileReader {
    /// Create a new G-code file reader
    ///
    /// # Arguments
    /// * `path` - Path to the G-code file
    ///
    /// # Errors
    /// Returns error if file does not exist or cannot be accessed
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            return Err(anyhow!("File does not exist: {}", path.display()));
        }

        if !path.is_file() {
            return Err(anyhow!("Path is not a file: {}", path.display()));
        }

        let metadata = fs::metadata(&path)
            .with_context(|| format!("Failed to stat {}", path.display()))?;
        let file_size = metadata.len();

        Ok(Self { path, file_size })
    }

    /// Get file size in bytes
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Get file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read entire file into memory
    ///
    /// A UTF-8 byte order mark is dropped; bytes that are not valid UTF-8 are
    /// replaced, since slicers only put them inside comments.
    ///
    /// # Errors
    /// Returns error if file cannot be read
    pub fn read_all(&self) -> Result<String> {
        if self.file_size > LARGE_FILE_BYTES {
            tracing::warn!(
                "Reading very large file ({}MB) into memory",
                self.file_size / (1024 * 1024)
            );
        }

        let bytes = fs::read(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let bytes = bytes
            .strip_prefix(&[0xEF_u8, 0xBB, 0xBF])
            .unwrap_or(bytes.as_slice());

        let text = match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => {
                tracing::warn!(
                    "{} is not valid UTF-8; replacing invalid bytes",
                    self.path.display()
                );
                String::from_utf8_lossy(bytes).into_owned()
            }
        };

        tracing::debug!(
            "Read {} bytes from {}",
            self.file_size,
            self.path.display()
        );
        Ok(text)
    }
}
