//! Probe injection.
//!
//! On the first dispatch of an event the start probe calls
//! [`ensure_instrumented`], which surrounds the event's real callbacks with
//! probes:
//!
//! ```text
//! priority:   First   5        5       10       10       Last
//!             ─────   ────     ─────   ────     ─────    ────
//! runs:       (start) real...  PHASE   real...  PHASE    STOP
//!              via "all"       closes 5         closes 10
//! ```
//!
//! Phase probes are registered after the real callbacks already present at
//! their priority, so the dispatcher's registration order runs them right
//! after that priority's batch. Callbacks registered later at the same
//! priority run after the probe and are charged to the next bucket.

use std::rc::Rc;

use log::debug;

use super::profiler::ProfilerState;
use crate::dispatch::{CallbackIdentity, Dispatcher, Hook, Priority};

/// Type name every probe identity is bound to.
///
/// The reporter drops callbacks bound to this name when listing what ran.
pub const PROBE_TYPE: &str = "hookscope::Profiler";

pub(crate) fn start_probe<D: Dispatcher + 'static>(state: &Rc<ProfilerState<D>>) -> Hook<D::Value> {
    let state = Rc::clone(state);
    Hook::new(CallbackIdentity::bound(PROBE_TYPE, "on_start"), move |value| {
        state.start();
        value
    })
}

fn phase_probe<D: Dispatcher + 'static>(state: &Rc<ProfilerState<D>>) -> Hook<D::Value> {
    let state = Rc::clone(state);
    Hook::new(CallbackIdentity::bound(PROBE_TYPE, "on_phase_boundary"), move |value| {
        state.phase_boundary(value)
    })
}

fn stop_probe<D: Dispatcher + 'static>(
    state: &Rc<ProfilerState<D>>,
    event: &str,
) -> Hook<D::Value> {
    let state = Rc::clone(state);
    let event = event.to_string();
    Hook::new(CallbackIdentity::bound(PROBE_TYPE, "on_stop"), move |value| {
        state.stop(&event, value)
    })
}

/// Install phase and stop probes for `event` unless already done.
///
/// The priorities are read before any probe for the event exists, so they
/// are exactly the priorities holding real callbacks. Phase probes go in
/// before the stop probe: when a real callback sits at `Priority::Last`
/// the order there is `real, phase, stop`.
///
/// Returns true if probes were installed by this call, false if the event
/// was already instrumented or the tracker is borrowed elsewhere.
pub(crate) fn ensure_instrumented<D: Dispatcher + 'static>(
    state: &Rc<ProfilerState<D>>,
    dispatcher: &D,
    event: &str,
) -> bool {
    // Held until the flow exists, so probes and flow record are installed together
    let Ok(mut tracker) = state.tracker.try_borrow_mut() else {
        debug!("tracker borrowed elsewhere, {event} left uninstrumented");
        return false;
    };
    if tracker.is_instrumented(event) {
        return false;
    }

    let boundaries = dispatcher.list_registered_priorities(event);
    for &priority in &boundaries {
        dispatcher.register_callback(event, priority, phase_probe(state));
    }
    dispatcher.register_callback(event, Priority::Last, stop_probe(state, event));

    debug!("instrumented {event} with {} phase boundaries", boundaries.len());
    tracker.register_flow(event, boundaries);
    true
}
