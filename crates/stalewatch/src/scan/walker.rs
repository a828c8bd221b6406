//! Lazy filesystem walk for a single rule root
//!
//! Enumeration is incremental so age classification and metric emission
//! overlap with the walk on large trees. The walk is best-effort:
//! unreadable entries are skipped with a warning, files that vanish
//! between enumeration and stat are skipped silently, and symlinks are
//! neither followed nor reported.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::warn;
use walkdir::WalkDir;

use super::error::ScanError;

/// Cooperative cancellation flag shared between a cycle and its walks.
///
/// A child token observes its parent: cancelling the parent cancels every
/// child, cancelling a child leaves the parent and its siblings running.
#[derive(Debug, Clone)]
pub struct CancelToken {
    own: Arc<AtomicBool>,
    parents: Vec<Arc<AtomicBool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            own: Arc::new(AtomicBool::new(false)),
            parents: Vec::new(),
        }
    }

    /// Derive a token that is cancelled whenever this one is.
    pub fn child(&self) -> Self {
        let mut parents = self.parents.clone();
        parents.push(Arc::clone(&self.own));
        Self {
            own: Arc::new(AtomicBool::new(false)),
            parents,
        }
    }

    pub fn cancel(&self) {
        self.own.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.own.load(Ordering::SeqCst) || self.parents.iter().any(|p| p.load(Ordering::SeqCst))
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// A regular file yielded by the walk.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Lazy iterator over the regular files under one root.
///
/// Re-invoking `new` performs a fresh enumeration; dropping the iterator
/// releases any open directory handles.
pub struct FileWalk {
    inner: walkdir::IntoIter,
    cancel: CancelToken,
}

impl FileWalk {
    /// Start a fresh enumeration of `root`.
    ///
    /// Fails up-front when the root is missing or not a directory; this
    /// must reach the caller rather than be swallowed mid-walk.
    pub fn new(root: &Path, recursive: bool, cancel: CancelToken) -> Result<Self, ScanError> {
        if !root.exists() {
            return Err(ScanError::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        let mut walker = WalkDir::new(root).follow_links(false).sort_by_file_name();
        if !recursive {
            // Top-level files only; directories are listed but never entered.
            walker = walker.max_depth(1);
        }

        Ok(Self {
            inner: walker.into_iter(),
            cancel,
        })
    }
}

impl Iterator for FileWalk {
    type Item = FileEntry;

    fn next(&mut self) -> Option<FileEntry> {
        loop {
            if self.cancel.is_cancelled() {
                return None;
            }

            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    // Permission denied or I/O failure on an entry or
                    // subtree: skip it, keep walking.
                    warn!(error = %err, "Skipping unreadable entry");
                    continue;
                }
            };

            // Directories only drive recursion; symlinks are skipped.
            if !entry.file_type().is_file() {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(err) => {
                    let vanished = err
                        .io_error()
                        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
                        .unwrap_or(false);
                    if !vanished {
                        warn!(path = %entry.path().display(), error = %err, "Skipping unreadable file");
                    }
                    // Vanished between enumeration and stat: a timing
                    // artifact, not a reportable condition.
                    continue;
                }
            };

            let modified = match metadata.modified() {
                Ok(modified) => modified,
                Err(err) => {
                    warn!(path = %entry.path().display(), error = %err, "Skipping file without modification time");
                    continue;
                }
            };

            return Some(FileEntry {
                path: entry.into_path(),
                modified,
            });
        }
    }
}
