//! Report aggregation for profiling data.
//!
//! Turns flow records into the ranked, explainable [`Report`] that the
//! renderers consume.
//!
//! # Data Flow
//!
//! ```text
//! FlowTable ──► totals (spans − nested) ──► grand totals
//!                   │
//!                   ▼
//!     live callbacks per priority (probes excluded, empty events dropped)
//!                   │
//!                   ▼
//!     stable sort by total ↓ ──► slowest ──► top N ──► phase bars
//! ```
//!
//! # Staleness window
//!
//! Totals and phase buckets were recorded while events ran. Callback lists
//! are read from the dispatcher when the report is built. Callbacks added
//! or removed in between are listed as they are now and matched to buckets
//! by priority only.

// Percentage calculations intentionally convert counts to f64
#![allow(clippy::cast_precision_loss)]

use log::debug;
use serde::Serialize;

use crate::dispatch::{CallbackIdentity, Dispatcher, Priority};
use crate::profiling::{FlowRecord, FlowTable, PROBE_TYPE};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Events rendered in detail by default.
pub const DEFAULT_REPORT_LIMIT: usize = 100;

// =============================================================================
// REPORT (OUTPUT TYPES)
// =============================================================================

/// Everything the renderers need, computed once.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Dispatched events with at least one real callback, before truncation.
    pub unique_events: usize,
    /// Invocations of every observed event, including dropped ones.
    pub total_calls: u64,
    /// Time of every observed event in ms, including dropped ones.
    pub total_ms: f64,
    /// First event of the ranking, `None` when nothing was observed.
    pub slowest: Option<SlowestEvent>,
    /// Ranked events, truncated to the report limit.
    pub events: Vec<EventReport>,
}

impl Report {
    /// Total of the slowest event, 0 when there is none.
    #[must_use]
    pub fn slowest_ms(&self) -> f64 {
        self.slowest.as_ref().map_or(0.0, |s| s.total_ms)
    }

    #[must_use]
    pub fn event(&self, name: &str) -> Option<&EventReport> {
        self.events.iter().find(|e| e.event_name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlowestEvent {
    pub event_name: String,
    pub total_ms: f64,
}

/// One ranked event.
#[derive(Debug, Clone, Serialize)]
pub struct EventReport {
    pub event_name: String,
    pub call_count: u64,
    pub total_ms: f64,
    pub per_call_ms: f64,
    /// Real callbacks across all priorities.
    pub callback_count: usize,
    /// Real callbacks grouped by priority, ascending.
    pub callbacks: Vec<PriorityCallbacks>,
    /// One bar per recorded priority bucket, ascending.
    pub phases: Vec<PhaseBar>,
    /// Time no bucket accounts for (probe overhead, callbacks added late).
    pub unattributed: UnattributedBar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorityCallbacks {
    pub priority: Priority,
    pub callbacks: Vec<CallbackIdentity>,
}

/// A priority bucket laid out as a percentage of the event's total.
///
/// Offsets are cumulative. Widths are not clamped, so measurement noise can
/// push the sum past 100% and leave the unattributed bar negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseBar {
    pub priority: Priority,
    pub duration_ms: f64,
    /// Real callbacks listed at this priority.
    pub callback_count: usize,
    pub offset_pct: f64,
    pub width_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnattributedBar {
    pub duration_ms: f64,
    pub offset_pct: f64,
    pub width_pct: f64,
}

// =============================================================================
// AGGREGATION
// =============================================================================

/// A flow record that survived the callback check, not yet laid out.
struct Ranked<'a> {
    flow: &'a FlowRecord,
    total_ms: f64,
    callbacks: Vec<PriorityCallbacks>,
    callback_count: usize,
}

/// Build the ranked report from `flows`, reading live callbacks from
/// `dispatcher`. At most `limit` events are laid out in detail.
pub fn build_report<D: Dispatcher + ?Sized>(
    flows: &FlowTable,
    dispatcher: &D,
    limit: usize,
) -> Report {
    let mut total_calls = 0;
    let mut total_ms = 0.0;
    let mut ranked = Vec::with_capacity(flows.len());

    for flow in flows.iter() {
        if flow.call_count() == 0 {
            debug!("dropping {} from report: instrumented but never dispatched", flow.name());
            continue;
        }
        let flow_total = flow.total_ms();
        total_calls += flow.call_count();
        total_ms += flow_total;

        let callbacks = live_callbacks(dispatcher, flow.name());
        let callback_count: usize = callbacks.iter().map(|p| p.callbacks.len()).sum();
        if callback_count == 0 {
            debug!("dropping {} from report: no callbacks registered", flow.name());
            continue;
        }
        ranked.push(Ranked { flow, total_ms: flow_total, callbacks, callback_count });
    }

    // Stable: equal totals keep first-observed order
    ranked.sort_by(|a, b| b.total_ms.total_cmp(&a.total_ms));

    let slowest = ranked
        .first()
        .map(|r| SlowestEvent { event_name: r.flow.name().to_string(), total_ms: r.total_ms });
    let unique_events = ranked.len();
    ranked.truncate(limit);

    Report {
        unique_events,
        total_calls,
        total_ms,
        slowest,
        events: ranked.into_iter().map(lay_out).collect(),
    }
}

/// Current callbacks of `event` per priority, without profiler probes.
fn live_callbacks<D: Dispatcher + ?Sized>(dispatcher: &D, event: &str) -> Vec<PriorityCallbacks> {
    dispatcher
        .list_registered_priorities(event)
        .into_iter()
        .filter_map(|priority| {
            let callbacks: Vec<_> = dispatcher
                .list_callbacks_at(event, priority)
                .into_iter()
                .filter(|identity| !identity.is_bound_to(PROBE_TYPE))
                .collect();
            (!callbacks.is_empty()).then_some(PriorityCallbacks { priority, callbacks })
        })
        .collect()
}

fn lay_out(ranked: Ranked<'_>) -> EventReport {
    let Ranked { flow, total_ms, callbacks, callback_count } = ranked;

    let mut offset = 0.0;
    let mut phases_ms = 0.0;
    let phases: Vec<PhaseBar> = flow
        .phase_durations()
        .iter()
        .map(|(&priority, duration)| {
            let duration_ms = duration.as_millis();
            let width = percent_of(duration_ms, total_ms);
            let bar = PhaseBar {
                priority,
                duration_ms,
                callback_count: callbacks
                    .iter()
                    .find(|p| p.priority == priority)
                    .map_or(0, |p| p.callbacks.len()),
                offset_pct: offset,
                width_pct: width,
            };
            offset += width;
            phases_ms += duration_ms;
            bar
        })
        .collect();

    let call_count = flow.call_count();
    EventReport {
        event_name: flow.name().to_string(),
        call_count,
        total_ms,
        per_call_ms: if call_count == 0 { 0.0 } else { total_ms / call_count as f64 },
        callback_count,
        callbacks,
        phases,
        unattributed: UnattributedBar {
            duration_ms: total_ms - phases_ms,
            offset_pct: offset,
            width_pct: 100.0 - offset,
        },
    }
}

/// `part` as a percentage of `whole`; 0 for an empty whole.
fn percent_of(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}
