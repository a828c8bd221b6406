//! Reporting sinks and the rule-level emission contract
//!
//! The core produces two kinds of output for the monitoring backend:
//! per-file `file_age` measurements and rule-scoped events. Transport is
//! somebody else's job; a sink only has to make each emission call
//! individually atomic so concurrent rules can share one instance.

pub mod json_sink;
pub mod log_sink;
pub mod memory;

pub use json_sink::JsonLineSink;
pub use log_sink::TracingSink;
pub use memory::MemorySink;

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::scan::age::format_age;
use crate::scan::types::ScanResult;

/// Metric key for per-file age measurements.
pub const FILE_AGE_METRIC: &str = "file_age";

/// Dimension tag identifying the file a measurement belongs to.
pub const FILE_DIMENSION: &str = "File";

/// One named measurement with dimension tags.
#[derive(Debug, Clone, Serialize)]
pub struct Measurement {
    pub key: String,
    /// Age in seconds.
    pub value: f64,
    pub dimensions: BTreeMap<String, String>,
}

impl Measurement {
    /// The `file_age` measurement for one stale file.
    pub fn file_age(path: &Path, age: Duration) -> Self {
        let mut dimensions = BTreeMap::new();
        dimensions.insert(FILE_DIMENSION.to_string(), path.display().to_string());
        Self {
            key: FILE_AGE_METRIC.to_string(),
            value: age.as_secs_f64(),
            dimensions,
        }
    }
}

/// Event severity as understood by the monitoring backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSeverity {
    Warning,
    Error,
}

/// A rule-scoped event for the monitoring backend.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringEvent {
    pub severity: EventSeverity,
    pub title: String,
    pub description: String,
    /// For stale-file alerts: file path mapped to its formatted age.
    pub properties: BTreeMap<String, String>,
}

/// Receives per-file measurements.
pub trait MetricSink: Send + Sync {
    fn absolute(&self, measurement: &Measurement);
}

/// Receives rule-scoped events.
pub trait EventSink: Send + Sync {
    fn report_event(&self, event: &MonitoringEvent);
}

/// Emit the outcome of one rule evaluation.
///
/// A failed rule produces exactly one error event and nothing else. A
/// rule with stale files produces one `file_age` measurement per file
/// and one aggregated warning event for the whole rule; alerts are
/// rule-scoped, measurements are file-scoped.
pub fn report_result(result: &ScanResult, metrics: &dyn MetricSink, events: &dyn EventSink) {
    let rule = &result.rule;

    if let Some(error) = &result.error {
        events.report_event(&MonitoringEvent {
            severity: EventSeverity::Error,
            title: "Folder scan failed".to_string(),
            description: format!("Error scanning folder '{}': {}", rule.path.display(), error),
            properties: BTreeMap::new(),
        });
        return;
    }

    let mut properties = BTreeMap::new();
    for file in &result.stale_files {
        metrics.absolute(&Measurement::file_age(&file.path, file.age));
        properties.insert(file.path.display().to_string(), format_age(file.age));
    }

    if !properties.is_empty() {
        events.report_event(&MonitoringEvent {
            severity: EventSeverity::Warning,
            title: "Stale files found".to_string(),
            description: format!(
                "Found {} file(s) older than {} minutes in folder '{}'",
                result.stale_files.len(),
                rule.threshold_minutes,
                rule.path.display()
            ),
            properties,
        });
    }
}

/// Emit a whole cycle, rule by rule.
pub fn report_cycle(results: &[ScanResult], metrics: &dyn MetricSink, events: &dyn EventSink) {
    for result in results {
        report_result(result, metrics, events);
    }
}
