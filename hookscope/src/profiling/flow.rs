//! Per-event flow records.
//!
//! A [`FlowRecord`] accumulates everything observed about one event name for
//! the whole request: how often it started, every completed span, the
//! nested time to subtract, and the time attributed to each priority bucket.
//! [`FlowTable`] keeps the records in first-observed order, which is what
//! the report's stable ranking falls back on for ties.

// Totals are converted from signed nanoseconds to f64 milliseconds
#![allow(clippy::cast_precision_loss)]

use std::collections::{BTreeMap, HashMap};

use crate::domain::{Duration, Priority, Timestamp};

/// A recorded interval of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    /// One complete invocation.
    Span { start: Timestamp, stop: Timestamp },
    /// Time a nested invocation spent inside this event, to be subtracted.
    Nested { sub: Duration },
}

impl Interval {
    /// Signed contribution to the event's total, in nanoseconds.
    #[must_use]
    pub fn signed_nanos(self) -> i128 {
        match self {
            Interval::Span { start, stop } => i128::from(stop.duration_since(start).0),
            Interval::Nested { sub } => -i128::from(sub.0),
        }
    }
}

/// Accumulated timing of one event name.
#[derive(Debug, Clone)]
pub struct FlowRecord {
    name: String,
    call_count: u64,
    /// Starts of invocations that have not stopped yet, innermost last.
    open: Vec<Timestamp>,
    intervals: Vec<Interval>,
    phase_boundaries: Vec<Priority>,
    phase_durations: BTreeMap<Priority, Duration>,
}

impl FlowRecord {
    #[must_use]
    pub fn new(name: &str, phase_boundaries: Vec<Priority>) -> Self {
        Self {
            name: name.to_string(),
            call_count: 0,
            open: Vec::new(),
            intervals: Vec::new(),
            phase_boundaries,
            phase_durations: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn call_count(&self) -> u64 {
        self.call_count
    }

    #[must_use]
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    #[must_use]
    pub fn phase_boundaries(&self) -> &[Priority] {
        &self.phase_boundaries
    }

    /// Time attributed to each priority bucket, ascending by priority.
    #[must_use]
    pub fn phase_durations(&self) -> &BTreeMap<Priority, Duration> {
        &self.phase_durations
    }

    /// Number of invocations started but not yet stopped.
    #[must_use]
    pub fn open_invocations(&self) -> usize {
        self.open.len()
    }

    /// Completed spans, in stop order.
    pub fn spans(&self) -> impl Iterator<Item = (Timestamp, Timestamp)> + '_ {
        self.intervals.iter().filter_map(|interval| match *interval {
            Interval::Span { start, stop } => Some((start, stop)),
            Interval::Nested { .. } => None,
        })
    }

    /// Spans minus nested time, in nanoseconds.
    ///
    /// Signed: a corrupted (unbalanced) trace can subtract more than it
    /// recorded, and the report shows that rather than hiding it.
    #[must_use]
    pub fn total_nanos(&self) -> i128 {
        self.intervals.iter().copied().map(Interval::signed_nanos).sum()
    }

    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_nanos() as f64 / 1_000_000.0
    }

    /// Sum of all phase buckets.
    #[must_use]
    pub fn phase_total(&self) -> Duration {
        self.phase_durations.values().fold(Duration::ZERO, |acc, d| acc + *d)
    }

    pub(crate) fn begin(&mut self, now: Timestamp) {
        self.call_count += 1;
        self.open.push(now);
    }

    /// Close the innermost open invocation, returning its duration.
    pub(crate) fn end(&mut self, now: Timestamp) -> Option<Duration> {
        let start = self.open.pop()?;
        self.intervals.push(Interval::Span { start, stop: now });
        Some(now.duration_since(start))
    }

    pub(crate) fn subtract_nested(&mut self, sub: Duration) {
        self.intervals.push(Interval::Nested { sub });
    }

    pub(crate) fn add_phase(&mut self, boundary: Priority, elapsed: Duration) {
        *self.phase_durations.entry(boundary).or_default() += elapsed;
    }
}

/// Flow records keyed by event name, iterated in first-observed order.
#[derive(Debug, Default)]
pub struct FlowTable {
    records: Vec<FlowRecord>,
    index: HashMap<String, usize>,
}

impl FlowTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FlowRecord> {
        self.index.get(name).map(|&i| &self.records[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FlowRecord> {
        self.index.get(name).map(|&i| &mut self.records[i])
    }

    /// Insert a record unless one exists. Returns true if it was inserted.
    pub fn insert(&mut self, record: FlowRecord) -> bool {
        if self.index.contains_key(record.name()) {
            return false;
        }
        self.index.insert(record.name().to_string(), self.records.len());
        self.records.push(record);
        true
    }

    pub fn get_or_insert(&mut self, name: &str) -> &mut FlowRecord {
        let i = match self.index.get(name) {
            Some(&i) => i,
            None => {
                self.index.insert(name.to_string(), self.records.len());
                self.records.push(FlowRecord::new(name, Vec::new()));
                self.records.len() - 1
            }
        };
        &mut self.records[i]
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlowRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
