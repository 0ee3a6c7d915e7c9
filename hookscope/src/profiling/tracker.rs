//! Timing tracker: the invocation stack and the flow table.
//!
//! Every probe firing ends up here as one of three transitions:
//!
//! ```text
//! on_start ──► on_phase_boundary* ──► on_stop
//!    │                │                  │
//!    │ push frame     │ close bucket     │ pop frame
//!    │ open span      │ on top frame     │ close span
//!    ▼                ▼                  ▼ charge parent (sub_call_time + Nested)
//! ```
//!
//! The tracker knows nothing about dispatchers or clocks: callers pass the
//! timestamp in, which keeps every transition scriptable in tests.
//!
//! # Known fragility
//!
//! A start whose stop never fires (a callback bailing out of the dispatch)
//! leaves its frame on the stack. Later phase and stop transitions are then
//! attributed to that stale frame. This is not detected.

use log::{debug, trace};

use super::flow::{FlowRecord, FlowTable};
use super::frame::InvocationFrame;
use crate::domain::{Priority, Timestamp};

#[derive(Debug, Default)]
pub struct Tracker {
    stack: Vec<InvocationFrame>,
    flows: FlowTable,
}

impl Tracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a flow record (and therefore probes) exists for `event`.
    #[must_use]
    pub fn is_instrumented(&self, event: &str) -> bool {
        self.flows.contains(event)
    }

    /// Create the flow record for `event` with its phase boundaries.
    ///
    /// Returns false, leaving the existing record untouched, if the event
    /// was already registered.
    pub fn register_flow(&mut self, event: &str, phase_boundaries: Vec<Priority>) -> bool {
        self.flows.insert(FlowRecord::new(event, phase_boundaries))
    }

    /// An invocation of `event` begins.
    pub fn on_start(&mut self, event: &str, now: Timestamp) {
        let flow = self.flows.get_or_insert(event);
        flow.begin(now);
        let boundaries = flow.phase_boundaries().to_vec();

        self.stack.push(InvocationFrame::new(event, now, boundaries));
        trace!("start {event} depth={}", self.stack.len());
    }

    /// A phase probe fired: close the running bucket of the top frame.
    ///
    /// Hands `value` back untouched; the probe may sit on a value filter.
    pub fn on_phase_boundary<V>(&mut self, now: Timestamp, value: V) -> V {
        let Some(frame) = self.stack.last_mut() else {
            debug!("phase probe fired with no invocation in flight");
            return value;
        };
        let Some((boundary, elapsed)) = frame.close_phase(now) else {
            debug!("phase probe fired past the last boundary of {}", frame.event_name);
            return value;
        };
        if let Some(flow) = self.flows.get_mut(&frame.event_name) {
            flow.add_phase(boundary, elapsed);
        }
        trace!("phase {} @{boundary} {elapsed}", frame.event_name);
        value
    }

    /// The stop probe of `event` fired.
    ///
    /// Closes the innermost open span of `event`, pops the top frame and,
    /// if another frame is underneath, charges the nested duration to it.
    pub fn on_stop<V>(&mut self, event: &str, now: Timestamp, value: V) -> V {
        let span = self.flows.get_mut(event).and_then(|flow| flow.end(now));

        let Some(frame) = self.stack.pop() else {
            debug!("stop probe of {event} fired with no invocation in flight");
            return value;
        };

        if let Some(parent) = self.stack.last_mut() {
            let nested = span.unwrap_or_else(|| now.duration_since(frame.start_time));
            parent.sub_call_time += nested;
            if let Some(flow) = self.flows.get_mut(&parent.event_name) {
                flow.subtract_nested(nested);
            }
            trace!("stop {event} nested in {} for {nested}", parent.event_name);
        } else {
            trace!("stop {event}");
        }
        value
    }

    /// Stamp a stop time on the innermost open span of `event` without
    /// touching the stack.
    ///
    /// Used when the report is produced from inside a dispatch, so the event
    /// still running shows up with its time so far. Returns false if the
    /// event had no open span.
    pub fn seal_open_interval(&mut self, event: &str, now: Timestamp) -> bool {
        self.flows.get_mut(event).and_then(|flow| flow.end(now)).is_some()
    }

    /// Number of invocations currently in flight.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    #[must_use]
    pub fn top(&self) -> Option<&InvocationFrame> {
        self.stack.last()
    }

    #[must_use]
    pub fn flows(&self) -> &FlowTable {
        &self.flows
    }

    #[must_use]
    pub fn flow(&self, event: &str) -> Option<&FlowRecord> {
        self.flows.get(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Duration;

    fn ms(n: u64) -> Timestamp {
        Timestamp(n * 1_000_000)
    }

    #[test]
    fn test_single_invocation_total_matches_span() {
        let mut tracker = Tracker::new();
        tracker.register_flow("init", vec![Priority::At(10)]);

        tracker.on_start("init", ms(0));
        tracker.on_phase_boundary(ms(5), ());
        tracker.on_stop("init", ms(5), ());

        let flow = tracker.flow("init").unwrap();
        assert_eq!(flow.call_count(), 1);
        assert_eq!(flow.total_ms(), 5.0);
        assert_eq!(flow.phase_durations()[&Priority::At(10)], Duration::from_millis(5));
        assert_eq!(tracker.depth(), 0);
    }

    #[test]
    fn test_nested_invocation_is_subtracted_from_parent() {
        let mut tracker = Tracker::new();
        tracker.register_flow("render", vec![Priority::At(10)]);
        tracker.register_flow("partial", vec![Priority::At(10)]);

        tracker.on_start("render", ms(0));
        tracker.on_start("partial", ms(4));
        tracker.on_phase_boundary(ms(7), ());
        tracker.on_stop("partial", ms(7), ());
        tracker.on_phase_boundary(ms(10), ());
        tracker.on_stop("render", ms(10), ());

        let render = tracker.flow("render").unwrap();
        let partial = tracker.flow("partial").unwrap();
        assert_eq!(partial.total_ms(), 3.0);
        assert_eq!(render.total_ms(), 7.0);
        assert_eq!(render.phase_durations()[&Priority::At(10)], Duration::from_millis(7));
    }

    #[test]
    fn test_recursive_event_keeps_outer_duration() {
        let mut tracker = Tracker::new();
        tracker.on_start("loop", ms(0));
        tracker.on_start("loop", ms(1));
        tracker.on_stop("loop", ms(3), ());
        tracker.on_stop("loop", ms(6), ());

        let flow = tracker.flow("loop").unwrap();
        assert_eq!(flow.call_count(), 2);
        // 6ms outer + 2ms inner - 2ms nested
        assert_eq!(flow.total_ms(), 6.0);
    }

    #[test]
    fn test_probes_outside_invocation_pass_value_through() {
        let mut tracker = Tracker::new();
        assert_eq!(tracker.on_phase_boundary(ms(1), "title"), "title");
        assert_eq!(tracker.on_stop("the_content", ms(2), 42), 42);
        assert!(tracker.flows().is_empty());
    }

    #[test]
    fn test_phase_cursor_never_passes_boundaries() {
        let mut tracker = Tracker::new();
        tracker.register_flow("init", vec![Priority::At(10)]);
        tracker.on_start("init", ms(0));
        tracker.on_phase_boundary(ms(1), ());
        tracker.on_phase_boundary(ms(2), ());

        let top = tracker.top().unwrap();
        assert_eq!(top.current_phase_index, 1);
        assert_eq!(tracker.flow("init").unwrap().phase_total(), Duration::from_millis(1));
    }

    #[test]
    fn test_register_flow_is_idempotent() {
        let mut tracker = Tracker::new();
        assert!(tracker.register_flow("init", vec![Priority::At(1)]));
        assert!(!tracker.register_flow("init", vec![Priority::At(2)]));
        assert_eq!(tracker.flow("init").unwrap().phase_boundaries(), &[Priority::At(1)]);
    }

    #[test]
    fn test_seal_open_interval_leaves_stack_alone() {
        let mut tracker = Tracker::new();
        tracker.on_start("wp_footer", ms(0));
        assert!(tracker.seal_open_interval("wp_footer", ms(4)));
        assert!(!tracker.seal_open_interval("wp_footer", ms(5)));

        assert_eq!(tracker.flow("wp_footer").unwrap().total_ms(), 4.0);
        assert_eq!(tracker.depth(), 1);
    }
}
