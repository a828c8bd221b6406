//! JSON-lines sink for machine-readable transport

use serde::Serialize;
use std::io::Write;
use std::sync::Mutex;
use tracing::warn;

use super::{EventSink, Measurement, MetricSink, MonitoringEvent};

/// Writes one JSON object per emission to the wrapped writer.
///
/// The writer lock keeps concurrent emissions line-atomic, so rules
/// evaluated in parallel may share one sink.
pub struct JsonLineSink<W: Write + Send> {
    writer: Mutex<W>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Record<'a> {
    Metric(&'a Measurement),
    Event(&'a MonitoringEvent),
}

impl<W: Write + Send> JsonLineSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the writer, e.g. to inspect captured output in tests.
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, record: &Record<'_>) {
        let mut line = match serde_json::to_string(record) {
            Ok(line) => line,
            Err(err) => {
                warn!(error = %err, "Failed to serialize report record");
                return;
            }
        };
        line.push('\n');

        let mut guard = match self.writer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(err) = guard.write_all(line.as_bytes()) {
            warn!(error = %err, "Failed to write report record");
        }
    }
}

impl<W: Write + Send> MetricSink for JsonLineSink<W> {
    fn absolute(&self, measurement: &Measurement) {
        self.emit(&Record::Metric(measurement));
    }
}

impl<W: Write + Send> EventSink for JsonLineSink<W> {
    fn report_event(&self, event: &MonitoringEvent) {
        self.emit(&Record::Event(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::Path;
    use std::time::Duration;

    #[test]
    fn test_metric_line_shape() {
        let sink = JsonLineSink::new(Vec::new());
        sink.absolute(&Measurement::file_age(
            Path::new("/data/in/b.txt"),
            Duration::from_secs(4200),
        ));

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let value: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(value["type"], "metric");
        assert_eq!(value["key"], "file_age");
        assert_eq!(value["value"], 4200.0);
        assert_eq!(value["dimensions"]["File"], "/data/in/b.txt");
    }

    #[test]
    fn test_event_line_shape() {
        let sink = JsonLineSink::new(Vec::new());
        let mut properties = BTreeMap::new();
        properties.insert("/data/in/b.txt".to_string(), "1h 10m".to_string());
        sink.report_event(&MonitoringEvent {
            severity: super::super::EventSeverity::Warning,
            title: "Stale files found".to_string(),
            description: "Found 1 file(s) older than 60 minutes in folder '/data/in'".to_string(),
            properties,
        });

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let value: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(value["type"], "event");
        assert_eq!(value["severity"], "warning");
        assert_eq!(value["properties"]["/data/in/b.txt"], "1h 10m");
    }
}
