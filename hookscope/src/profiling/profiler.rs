//! The profiler handle and the state its probes share.
//!
//! One [`Profiler`] is attached to one dispatcher for the lifetime of one
//! request. Probe closures hold an `Rc` to the shared [`ProfilerState`],
//! which holds only a `Weak` back to the dispatcher, so the
//! dispatcher → probe → state chain never forms a cycle.

use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};

use log::debug;

use super::probes;
use super::tracker::Tracker;
use crate::analysis::{self, Report, DEFAULT_REPORT_LIMIT};
use crate::clock::{Clock, MonotonicClock};
use crate::dispatch::{Dispatcher, Priority, ALL_EVENTS};

/// Profiler settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilerConfig {
    /// Events rendered in detail; headline numbers always cover every event.
    pub report_limit: usize,
    /// When the report is built during a dispatch, close the open span of
    /// the event being dispatched so it is not missing from the report.
    pub seal_in_flight: bool,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self { report_limit: DEFAULT_REPORT_LIMIT, seal_in_flight: true }
    }
}

pub(crate) struct ProfilerState<D: Dispatcher> {
    pub(crate) tracker: RefCell<Tracker>,
    clock: Rc<dyn Clock>,
    dispatcher: Weak<D>,
}

impl<D: Dispatcher + 'static> ProfilerState<D> {
    pub(crate) fn start(self: &Rc<Self>) {
        let Some(dispatcher) = self.dispatcher.upgrade() else {
            return;
        };
        let Some(event) = dispatcher.current_event_name() else {
            return;
        };
        if event == ALL_EVENTS {
            return;
        }

        probes::ensure_instrumented(self, &dispatcher, &event);
        let now = self.clock.now();
        let Ok(mut tracker) = self.tracker.try_borrow_mut() else {
            debug!("tracker borrowed elsewhere, start of {event} not recorded");
            return;
        };
        tracker.on_start(&event, now);
    }

    pub(crate) fn phase_boundary<V>(&self, value: V) -> V {
        let now = self.clock.now();
        let Ok(mut tracker) = self.tracker.try_borrow_mut() else {
            debug!("tracker borrowed elsewhere, phase boundary not recorded");
            return value;
        };
        tracker.on_phase_boundary(now, value)
    }

    pub(crate) fn stop<V>(&self, event: &str, value: V) -> V {
        let now = self.clock.now();
        let Ok(mut tracker) = self.tracker.try_borrow_mut() else {
            debug!("tracker borrowed elsewhere, stop of {event} not recorded");
            return value;
        };
        tracker.on_stop(event, now, value)
    }
}

/// Request-scoped profiler attached to a dispatcher.
pub struct Profiler<D: Dispatcher + 'static> {
    state: Rc<ProfilerState<D>>,
    dispatcher: Rc<D>,
    config: ProfilerConfig,
}

impl<D: Dispatcher + 'static> Profiler<D> {
    /// Attach to `dispatcher`: registers the start probe, which observes
    /// every dispatch and instruments each event on first sight.
    pub fn attach(dispatcher: &Rc<D>, clock: Rc<dyn Clock>, config: ProfilerConfig) -> Self {
        let state = Rc::new(ProfilerState {
            tracker: RefCell::new(Tracker::new()),
            clock,
            dispatcher: Rc::downgrade(dispatcher),
        });
        dispatcher.register_callback(ALL_EVENTS, Priority::First, probes::start_probe(&state));
        debug!("profiler attached (report limit {})", config.report_limit);

        Self { state, dispatcher: Rc::clone(dispatcher), config }
    }

    /// Attach with wall-clock timing and default settings.
    pub fn with_monotonic_clock(dispatcher: &Rc<D>) -> Self {
        Self::attach(dispatcher, Rc::new(MonotonicClock::new()), ProfilerConfig::default())
    }

    /// Install probes for `event` now instead of on its first dispatch.
    ///
    /// Returns false if the event was already instrumented.
    pub fn ensure_instrumented(&self, event: &str) -> bool {
        probes::ensure_instrumented(&self.state, &self.dispatcher, event)
    }

    #[must_use]
    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    /// Borrow the raw tracking state.
    ///
    /// Probes that fire while this borrow is held record nothing, so holding
    /// it across a dispatch leaves that dispatch out of the report.
    #[must_use]
    pub fn tracker(&self) -> Ref<'_, Tracker> {
        self.state.tracker.borrow()
    }

    /// Aggregate everything observed so far into a ranked report.
    ///
    /// Callback lists are read from the dispatcher now, not when the events
    /// ran: callbacks added or removed in between show up as they are at
    /// this moment, aligned to the recorded buckets by priority only. Meant
    /// to be called once, after the interesting events have fired.
    pub fn build_report(&self) -> Report {
        if self.config.seal_in_flight {
            if let Some(event) = self.dispatcher.current_event_name() {
                let now = self.state.clock.now();
                let sealed = self
                    .state
                    .tracker
                    .try_borrow_mut()
                    .is_ok_and(|mut tracker| tracker.seal_open_interval(&event, now));
                if sealed {
                    debug!("sealed in-flight span of {event}");
                }
            }
        }

        let tracker = self.state.tracker.borrow();
        analysis::build_report(tracker.flows(), self.dispatcher.as_ref(), self.config.report_limit)
    }
}
