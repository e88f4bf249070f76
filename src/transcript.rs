//! Transcript store
//!
//! Flat file holding every accepted chat line, replayed to newcomers.
//! Clear, append and read are serialized by one lock, which callers can
//! also hold across a sequence of operations.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Default transcript file name
pub const DEFAULT_TRANSCRIPT_PATH: &str = "chat.log";

#[derive(Debug)]
pub struct Transcript {
    path: PathBuf,
    lock: Mutex<()>,
}

impl Transcript {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hold the transcript exclusively across several operations
    ///
    /// Sessions keep the guard while they read the history and join, or
    /// while they append a line and fan it out, so a newcomer sees every
    /// line exactly once.
    pub async fn lock(&self) -> TranscriptGuard<'_> {
        TranscriptGuard {
            path: &self.path,
            _guard: self.lock.lock().await,
        }
    }

    /// Truncate the transcript to empty, creating it if needed
    pub async fn clear(&self) -> io::Result<()> {
        self.lock().await.clear().await
    }

    /// Append a line verbatim to the end of the transcript
    pub async fn append(&self, line: &str) -> io::Result<()> {
        self.lock().await.append(line).await
    }

    /// Whole transcript as one string
    pub async fn read_all(&self) -> io::Result<String> {
        self.lock().await.read_all().await
    }
}

/// Exclusive access to the transcript file
#[derive(Debug)]
pub struct TranscriptGuard<'a> {
    path: &'a Path,
    _guard: MutexGuard<'a, ()>,
}

impl TranscriptGuard<'_> {
    pub async fn clear(&self) -> io::Result<()> {
        fs::write(self.path, b"").await?;
        debug!("Transcript {} cleared", self.path.display());
        Ok(())
    }

    pub async fn append(&self, line: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }

    pub async fn read_all(&self) -> io::Result<String> {
        fs::read_to_string(self.path).await
    }
}
