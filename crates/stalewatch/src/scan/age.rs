//! Pure age computation and staleness classification

use std::time::{Duration, SystemTime};

/// Age of a file relative to a reference instant, with its verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeClass {
    pub age: Duration,
    pub is_stale: bool,
}

/// Classify a modification time against a threshold.
///
/// The age saturates to zero when the modification time is in the future
/// (clock skew on network mounts). The comparison is strictly
/// greater-than: a file exactly at the threshold is not stale.
pub fn classify(modified: SystemTime, now: SystemTime, threshold: Duration) -> AgeClass {
    let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
    AgeClass {
        age,
        is_stale: age > threshold,
    }
}

/// Compact human form of an age: "4d 7h", "1h 10m", "45s".
pub fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let mins = (secs % 3600) / 60;

    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs % 60)
    } else {
        format!("{}s", secs)
    }
}
