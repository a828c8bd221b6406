//! In-memory capture sink for tests and dry runs

use std::sync::Mutex;

use super::{EventSink, Measurement, MetricSink, MonitoringEvent};

/// Captures every emission; the test double for both sink traits.
#[derive(Debug, Default)]
pub struct MemorySink {
    metrics: Mutex<Vec<Measurement>>,
    events: Mutex<Vec<MonitoringEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics(&self) -> Vec<Measurement> {
        self.metrics.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<MonitoringEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl MetricSink for MemorySink {
    fn absolute(&self, measurement: &Measurement) {
        self.metrics.lock().unwrap().push(measurement.clone());
    }
}

impl EventSink for MemorySink {
    fn report_event(&self, event: &MonitoringEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
