//! Reference hook registry.
//!
//! Semantics:
//!
//! - callbacks run in ascending [`Priority`], registration order within one
//!   priority
//! - observers registered under [`ALL_EVENTS`] run first on every dispatch,
//!   and callbacks they add to the dispatched event join that dispatch
//! - dispatch is re-entrant: a callback may dispatch any event, including
//!   the one currently running
//!
//! The callback list is snapshotted once the observers are done, so adding
//! or removing callbacks from inside a callback only affects later
//! dispatches.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

use log::trace;

use super::{CallbackIdentity, Dispatcher, Hook, Priority, ALL_EVENTS};

type PriorityTable<V> = BTreeMap<Priority, Vec<Hook<V>>>;

/// Single-threaded, re-entrant, priority-ordered dispatcher.
pub struct HookRegistry<V = ()> {
    events: RefCell<HashMap<String, PriorityTable<V>>>,
    /// Names of the dispatches currently on the call stack, innermost last.
    running: RefCell<Vec<String>>,
    next_anonymous: Cell<u64>,
}

impl<V> Default for HookRegistry<V> {
    fn default() -> Self {
        Self {
            events: RefCell::new(HashMap::new()),
            running: RefCell::new(Vec::new()),
            next_anonymous: Cell::new(1),
        }
    }
}

impl<V> HookRegistry<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback labelled with `identity`.
    pub fn add(
        &self,
        event: &str,
        priority: impl Into<Priority>,
        identity: CallbackIdentity,
        func: impl Fn(V) -> V + 'static,
    ) {
        self.register_callback(event, priority.into(), Hook::new(identity, func));
    }

    /// Register a closure without a name and return the identity it got.
    pub fn add_anonymous(
        &self,
        event: &str,
        priority: impl Into<Priority>,
        func: impl Fn(V) -> V + 'static,
    ) -> CallbackIdentity {
        let id = self.next_anonymous.get();
        self.next_anonymous.set(id + 1);
        let identity = CallbackIdentity::Anonymous(id);
        self.add(event, priority, identity.clone(), func);
        identity
    }

    /// Remove the first callback at `priority` matching `identity`.
    ///
    /// Returns false when nothing matched.
    pub fn remove_callback(
        &self,
        event: &str,
        priority: Priority,
        identity: &CallbackIdentity,
    ) -> bool {
        let mut events = self.events.borrow_mut();
        let Some(table) = events.get_mut(event) else {
            return false;
        };
        let Some(hooks) = table.get_mut(&priority) else {
            return false;
        };
        let Some(pos) = hooks.iter().position(|h| h.identity() == identity) else {
            return false;
        };
        hooks.remove(pos);
        if hooks.is_empty() {
            table.remove(&priority);
        }
        true
    }

    /// Total callbacks registered for `event`, across all priorities.
    #[must_use]
    pub fn callback_count(&self, event: &str) -> usize {
        self.events.borrow().get(event).map_or(0, |table| table.values().map(Vec::len).sum())
    }

    /// Whether any dispatch is currently running.
    #[must_use]
    pub fn is_dispatching(&self) -> bool {
        !self.running.borrow().is_empty()
    }

    /// Run every callback of `event`, threading `value` through them.
    pub fn dispatch(&self, event: &str, value: V) -> V {
        self.running.borrow_mut().push(event.to_string());
        trace!("dispatch {event}");

        let mut value = value;
        if event != ALL_EVENTS {
            for hook in self.snapshot(ALL_EVENTS) {
                value = hook.call(value);
            }
        }
        for hook in self.snapshot(event) {
            value = hook.call(value);
        }

        self.running.borrow_mut().pop();
        value
    }

    /// Clone the run list of `event` so no borrow is held while callbacks run.
    fn snapshot(&self, event: &str) -> Vec<Hook<V>> {
        self.events
            .borrow()
            .get(event)
            .map(|table| table.values().flatten().cloned().collect())
            .unwrap_or_default()
    }
}

impl<V> Dispatcher for HookRegistry<V> {
    type Value = V;

    fn register_callback(&self, event: &str, priority: Priority, hook: Hook<V>) {
        self.events
            .borrow_mut()
            .entry(event.to_string())
            .or_default()
            .entry(priority)
            .or_default()
            .push(hook);
    }

    fn current_event_name(&self) -> Option<String> {
        self.running.borrow().last().cloned()
    }

    fn list_registered_priorities(&self, event: &str) -> Vec<Priority> {
        self.events
            .borrow()
            .get(event)
            .map(|table| {
                table.iter().filter(|(_, hooks)| !hooks.is_empty()).map(|(p, _)| *p).collect()
            })
            .unwrap_or_default()
    }

    fn list_callbacks_at(&self, event: &str, priority: Priority) -> Vec<CallbackIdentity> {
        self.events
            .borrow()
            .get(event)
            .and_then(|table| table.get(&priority))
            .map(|hooks| hooks.iter().map(|h| h.identity().clone()).collect())
            .unwrap_or_default()
    }
}
