//! Error types for the scan core

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Scan error type
///
/// Every variant is isolated to the rule that produced it; the engine
/// folds these into `ScanResult.error` instead of raising them.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Scan cancelled")]
    Cancelled,

    #[error("Rule evaluation exceeded its {budget_secs}s budget")]
    Timeout { budget_secs: u64 },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ScanError>;
