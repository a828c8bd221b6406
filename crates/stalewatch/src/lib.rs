//! Stalewatch - Core Library
//!
//! Scans configured folders for files whose age exceeds a per-folder
//! threshold and reports per-file age metrics plus one aggregated alert
//! event per folder. Polling based: inotify-style watching does not work
//! on network filesystems (SMB, NFS), so each cycle is a fresh sweep.

pub mod report;
pub mod scan;

pub use report::{
    report_cycle, report_result, EventSeverity, EventSink, JsonLineSink, Measurement, MemorySink,
    MetricSink, MonitoringEvent, TracingSink,
};
pub use scan::{
    evaluate_rule, load_rules, parse_rules, run_cycle, CancelToken, CycleOptions, CycleStats,
    FileObservation, FolderRule, RuleParseError, ScanError, ScanResult, SkippedLine,
};
