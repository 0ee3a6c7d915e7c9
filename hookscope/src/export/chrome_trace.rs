//! Chrome Trace Event Format export of recorded spans.
//!
//! Each completed span becomes one complete (`"X"`) event. Nested
//! invocations sit inside their parent's time range, so trace viewers stack
//! them without any explicit parent links.

use std::collections::HashMap;
use std::io::Write;

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::domain::{ExportError, Timestamp};
use crate::profiling::FlowTable;

/// Trace viewers need a pid/tid; everything here ran on one thread.
const TRACE_PID: u32 = 1;
const TRACE_TID: u32 = 1;

/// Chrome Trace Event format
/// Format: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU/preview
#[derive(Debug, Clone, Serialize)]
struct ChromeTraceEvent {
    /// Event name
    name: String,
    /// Category for filtering/coloring
    cat: String,
    /// Phase: "X" = complete, "M" = metadata
    ph: String,
    /// Timestamp in microseconds, relative to the first span
    ts: f64,
    /// Duration in microseconds (complete events only)
    #[serde(skip_serializing_if = "Option::is_none")]
    dur: Option<f64>,
    pid: u32,
    tid: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    args: Option<HashMap<String, JsonValue>>,
}

/// Chrome Trace Format container
#[derive(Debug, Serialize)]
struct ChromeTrace {
    #[serde(rename = "traceEvents")]
    trace_events: Vec<ChromeTraceEvent>,
    #[serde(rename = "displayTimeUnit")]
    display_time_unit: String,
}

/// Collects spans from a flow table and writes them as a trace file.
#[derive(Debug, Default)]
pub struct ChromeTraceExporter {
    events: Vec<ChromeTraceEvent>,
}

impl ChromeTraceExporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an exporter holding every completed span in `flows`, ordered by
    /// start time.
    #[must_use]
    pub fn from_flows(flows: &FlowTable) -> Self {
        let mut spans: Vec<(&str, Timestamp, Timestamp)> = flows
            .iter()
            .flat_map(|flow| flow.spans().map(move |(start, stop)| (flow.name(), start, stop)))
            .collect();
        // Outer spans first when two start together, so viewers nest correctly
        spans.sort_by_key(|&(_, start, stop)| (start, std::cmp::Reverse(stop)));

        let origin = spans.first().map_or(Timestamp(0), |&(_, start, _)| start);
        let mut exporter = Self::new();
        for (name, start, stop) in spans {
            exporter.add_span(
                name,
                start.duration_since(origin).as_micros(),
                stop.duration_since(start).as_micros(),
            );
        }
        exporter
    }

    /// Add one complete event. Times are in microseconds.
    pub fn add_span(&mut self, name: &str, ts_us: f64, dur_us: f64) {
        self.events.push(ChromeTraceEvent {
            name: name.to_string(),
            cat: "hook".to_string(),
            ph: "X".to_string(),
            ts: ts_us,
            dur: Some(dur_us),
            pid: TRACE_PID,
            tid: TRACE_TID,
            args: None,
        });
    }

    /// Export the trace to any writer (file, stdout, buffer, etc.)
    ///
    /// # Errors
    /// Returns an error if serialization or the writer fails.
    pub fn export<W: Write>(&self, writer: W) -> Result<(), ExportError> {
        let mut all_events = self.events.clone();

        let mut args = HashMap::new();
        args.insert("name".to_string(), serde_json::json!("request"));
        all_events.push(ChromeTraceEvent {
            name: "thread_name".to_string(),
            cat: String::new(),
            ph: "M".to_string(),
            ts: 0.0,
            dur: None,
            pid: TRACE_PID,
            tid: TRACE_TID,
            args: Some(args),
        });

        let trace = ChromeTrace { trace_events: all_events, display_time_unit: "ms".to_string() };
        serde_json::to_writer_pretty(writer, &trace)?;
        Ok(())
    }

    /// Get the number of spans collected
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}
