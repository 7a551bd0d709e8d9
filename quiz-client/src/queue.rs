//! Durable FIFO of submissions awaiting delivery.
//!
//! The whole queue is rewritten on every mutation: encoded, written to a
//! sibling temp file, fsynced, then renamed over the target. A crash at any
//! point leaves either the old or the new file in place. If persisting
//! fails the in-memory mutation is undone, so memory and disk agree.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use quiz_types::{decode_queue, encode_queue, CodecError, PendingSubmission};
use thiserror::Error;

/// Queue persistence errors.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The queue could not be encoded.
    #[error("failed to encode pending queue: {0}")]
    Codec(#[from] CodecError),

    /// A file operation failed.
    #[error("failed to {operation} {path}: {source}")]
    Io {
        /// What was being done.
        operation: &'static str,
        /// The file involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Pending-submission queue bound to a file.
#[derive(Debug)]
pub struct PendingQueue {
    path: PathBuf,
    items: VecDeque<PendingSubmission>,
}

impl PendingQueue {
    /// Load the queue stored at `path`.
    ///
    /// A missing, truncated, corrupt or newer-version file yields an
    /// empty queue; the problem is logged, not returned.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let items = match fs::read(&path) {
            Ok(bytes) => match decode_queue(&bytes) {
                Ok(records) => {
                    tracing::debug!(path = %path.display(), count = records.len(), "pending queue loaded");
                    records.into()
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "discarding unreadable pending queue");
                    VecDeque::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => VecDeque::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read pending queue, starting empty");
                VecDeque::new()
            }
        };
        Self { path, items }
    }

    /// Append a submission at the tail.
    pub fn enqueue(&mut self, item: PendingSubmission) -> Result<(), QueueError> {
        self.items.push_back(item);
        if let Err(e) = self.persist() {
            self.items.pop_back();
            return Err(e);
        }
        Ok(())
    }

    /// Peek at the head.
    pub fn front(&self) -> Option<&PendingSubmission> {
        self.items.front()
    }

    /// Remove and return the head.
    pub fn drain_next(&mut self) -> Result<Option<PendingSubmission>, QueueError> {
        let Some(head) = self.items.pop_front() else {
            return Ok(None);
        };
        if let Err(e) = self.persist() {
            self.items.push_front(head);
            return Err(e);
        }
        Ok(Some(head))
    }

    /// Remove everything.
    pub fn clear(&mut self) -> Result<(), QueueError> {
        let previous = std::mem::take(&mut self.items);
        if let Err(e) = self.persist() {
            self.items = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Number of queued submissions.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Queued submissions, head first.
    pub fn iter(&self) -> impl Iterator<Item = &PendingSubmission> {
        self.items.iter()
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&mut self) -> Result<(), QueueError> {
        let bytes = encode_queue(self.items.make_contiguous())?;
        write_atomic(&self.path, &bytes)
    }
}

/// Write `bytes` to `path` via a temp file + fsync + rename.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), QueueError> {
    let io_error = |operation, path: &Path| {
        let path = path.to_path_buf();
        move |source| QueueError::Io {
            operation,
            path,
            source,
        }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error("create directory", parent))?;
    }

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let mut file = File::create(&temp_path).map_err(io_error("create", &temp_path))?;
    file.write_all(bytes).map_err(io_error("write", &temp_path))?;
    file.sync_all().map_err(io_error("sync", &temp_path))?;
    drop(file);

    fs::rename(&temp_path, path).map_err(io_error("replace", path))?;
    Ok(())
}
