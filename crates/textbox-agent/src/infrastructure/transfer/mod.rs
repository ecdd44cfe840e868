//! Transfer file: the single-slot mailbox between completion and injection.
//!
//! The completion stage overwrites `output.txt` with the latest response; the
//! injection stage (and the replay hotkey) reads the whole file back.  Only
//! the most recent response is kept.
//!
//! Writes go to a sibling temporary file first and are then renamed over the
//! target, so a concurrent reader sees either the old content or the new
//! content, never a half-written file.  Which of the two it sees when a write
//! races a read is not defined: last writer wins.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

pub use crate::application::inject_text::TransferStore;

/// Fixed name of the transfer file in the working directory.
pub const TRANSFER_FILE_NAME: &str = "output.txt";

/// File-backed [`TransferStore`].
#[derive(Debug, Clone)]
pub struct TransferFile {
    path: PathBuf,
}

impl TransferFile {
    /// Uses `path` as the transfer file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses [`TRANSFER_FILE_NAME`] relative to the process working directory.
    pub fn in_working_dir() -> Self {
        Self::new(TRANSFER_FILE_NAME)
    }

    /// Path of the transfer file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| TRANSFER_FILE_NAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TransferStore for TransferFile {
    fn write(&self, text: &str) -> std::io::Result<()> {
        let tmp = self.temp_path();
        std::fs::write(&tmp, text.as_bytes())?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), bytes = text.len(), "transfer file written");
        Ok(())
    }

    fn read(&self) -> std::io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
