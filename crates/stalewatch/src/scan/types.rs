//! Core types for a scan cycle
//!
//! Everything here is transient: produced while a rule is evaluated,
//! consumed by the reporting step, then discarded. A file that stays
//! stale is reported again on every subsequent cycle.

use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use super::error::ScanError;
use super::rule::FolderRule;

// Custom serialization for SystemTime (unix seconds)
mod system_time_serde {
    use serde::{Serialize, Serializer};
    use std::time::SystemTime;

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration = time
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_err(serde::ser::Error::custom)?;
        duration.as_secs().serialize(serializer)
    }
}

// Custom serialization for Duration (whole seconds)
mod duration_secs_serde {
    use serde::{Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }
}

/// One stale file seen during a rule evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct FileObservation {
    pub path: PathBuf,
    #[serde(with = "duration_secs_serde")]
    pub age: Duration,
    #[serde(with = "system_time_serde")]
    pub modified: SystemTime,
}

impl FileObservation {
    /// Age in seconds, the unit the metric pipeline expects.
    pub fn age_secs(&self) -> f64 {
        self.age.as_secs_f64()
    }
}

/// Outcome of evaluating one rule: either the stale files found, or the
/// failure that stopped the walk. Never both.
#[derive(Debug)]
pub struct ScanResult {
    pub rule: FolderRule,
    pub stale_files: Vec<FileObservation>,
    pub error: Option<ScanError>,
    /// Regular files enumerated, stale or not.
    pub files_seen: u64,
    pub duration_ms: u64,
}

impl ScanResult {
    /// A result for a rule whose walk never produced usable output.
    pub fn failed(rule: FolderRule, error: ScanError, elapsed: Duration) -> Self {
        Self {
            rule,
            stale_files: Vec::new(),
            error: Some(error),
            files_seen: 0,
            duration_ms: elapsed.as_millis() as u64,
        }
    }

    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }
}

/// Aggregate counters for one full cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleStats {
    pub rules_evaluated: u64,
    pub rules_failed: u64,
    pub files_seen: u64,
    pub stale_files: u64,
}

impl CycleStats {
    pub fn collect(results: &[ScanResult]) -> Self {
        let mut stats = Self {
            rules_evaluated: results.len() as u64,
            ..Self::default()
        };
        for result in results {
            if result.is_err() {
                stats.rules_failed += 1;
            }
            stats.files_seen += result.files_seen;
            stats.stale_files += result.stale_files.len() as u64;
        }
        stats
    }
}
