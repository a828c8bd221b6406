//! Sink that emits through the tracing pipeline

use tracing::{error, info, warn};

use super::{EventSeverity, EventSink, Measurement, MetricSink, MonitoringEvent};

/// Default sink: measurements and events become structured log records.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl MetricSink for TracingSink {
    fn absolute(&self, measurement: &Measurement) {
        info!(
            key = %measurement.key,
            value = measurement.value,
            dimensions = ?measurement.dimensions,
            "metric"
        );
    }
}

impl EventSink for TracingSink {
    fn report_event(&self, event: &MonitoringEvent) {
        match event.severity {
            EventSeverity::Warning => warn!(
                title = %event.title,
                description = %event.description,
                properties = ?event.properties,
                "event"
            ),
            EventSeverity::Error => error!(
                title = %event.title,
                description = %event.description,
                "event"
            ),
        }
    }
}
