//! # Shared Vocabulary (Host Dispatcher ↔ Profiler)
//!
//! Defines the contract between a host hook/event dispatcher and the
//! `hookscope` profiler. A host integrates by implementing [`Dispatcher`];
//! it never needs to depend on the profiler crate itself.
//!
//! ## Key Types
//!
//! - [`Priority`] - Ordering of callbacks inside one event, with dedicated
//!   run-first and run-last sentinels
//! - [`CallbackIdentity`] - Display label of a registered callback
//! - [`Hook`] - A callable registered with the dispatcher
//! - [`Dispatcher`] - The capability the profiler consumes
//!
//! ## Dispatch Contract
//!
//! ```text
//! dispatch("render", value)
//!     │
//!     ├──► observers of ALL_EVENTS        (may register new callbacks)
//!     │
//!     ├──► Priority::First callbacks      ─┐
//!     ├──► Priority::At(n) ascending       │ registration order
//!     └──► Priority::Last callbacks       ─┘ within one priority
//! ```

use std::fmt;
use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Wildcard event name.
///
/// Callbacks registered under this name observe every dispatch, before any
/// callback of the dispatched event runs. Callbacks added to the dispatched
/// event while the observers run take part in that same dispatch.
pub const ALL_EVENTS: &str = "all";

// ============================================================================
// Priority
// ============================================================================

/// Position of a callback in an event's run order.
///
/// The derived ordering puts every `At(n)` strictly between the two
/// sentinels, so a callback at `Last` runs after all numbered callbacks no
/// matter how large their number is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Priority {
    /// Runs before every numbered priority.
    First,
    /// Ordinary numbered priority, lower runs earlier.
    At(i64),
    /// Runs after every numbered priority.
    Last,
}

impl Priority {
    /// Priority hosts conventionally use when none is given.
    pub const DEFAULT: Priority = Priority::At(10);

    /// Returns true for the `First` and `Last` sentinels.
    #[must_use]
    pub fn is_sentinel(self) -> bool {
        !matches!(self, Priority::At(_))
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<i64> for Priority {
    fn from(n: i64) -> Self {
        Priority::At(n)
    }
}

impl From<i32> for Priority {
    fn from(n: i32) -> Self {
        Priority::At(i64::from(n))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::First => write!(f, "first"),
            Priority::At(n) => write!(f, "{n}"),
            Priority::Last => write!(f, "last"),
        }
    }
}

// ============================================================================
// Callback Identity
// ============================================================================

/// How a registered callback is labelled in reports.
///
/// Produced by the dispatcher; the profiler only displays it and compares it
/// against its own probe identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "value", rename_all = "snake_case"))]
pub enum CallbackIdentity {
    /// Free function or otherwise plainly named callback.
    Named(String),
    /// Method bound to a type or an instance of it.
    BoundMethod { type_name: String, method: String },
    /// Closure without a name; the id is assigned by the dispatcher.
    Anonymous(u64),
}

impl CallbackIdentity {
    pub fn named(name: impl Into<String>) -> Self {
        CallbackIdentity::Named(name.into())
    }

    pub fn bound(type_name: impl Into<String>, method: impl Into<String>) -> Self {
        CallbackIdentity::BoundMethod { type_name: type_name.into(), method: method.into() }
    }

    /// Parse a display label back into an identity.
    ///
    /// `"Type::method"` becomes a bound method (split at the last `::`),
    /// anything else a named callback.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.rsplit_once("::") {
            Some((type_name, method)) if !type_name.is_empty() && !method.is_empty() => {
                Self::bound(type_name, method)
            }
            _ => Self::named(label),
        }
    }

    /// True if this is a method bound to `type_name`.
    #[must_use]
    pub fn is_bound_to(&self, type_name: &str) -> bool {
        matches!(self, CallbackIdentity::BoundMethod { type_name: t, .. } if t == type_name)
    }
}

impl fmt::Display for CallbackIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackIdentity::Named(name) => write!(f, "{name}"),
            CallbackIdentity::BoundMethod { type_name, method } => {
                write!(f, "{type_name}::{method}")
            }
            CallbackIdentity::Anonymous(id) => write!(f, "{{closure#{id}}}"),
        }
    }
}

// ============================================================================
// Hook
// ============================================================================

/// A callable registered with a dispatcher.
///
/// Every hook receives the dispatched value and returns it, possibly
/// transformed. Action-style hooks simply hand the value back.
pub struct Hook<V> {
    identity: CallbackIdentity,
    func: Rc<dyn Fn(V) -> V>,
}

impl<V> Hook<V> {
    pub fn new(identity: CallbackIdentity, func: impl Fn(V) -> V + 'static) -> Self {
        Self { identity, func: Rc::new(func) }
    }

    #[must_use]
    pub fn identity(&self) -> &CallbackIdentity {
        &self.identity
    }

    pub fn call(&self, value: V) -> V {
        (self.func)(value)
    }
}

impl<V> Clone for Hook<V> {
    fn clone(&self) -> Self {
        Self { identity: self.identity.clone(), func: Rc::clone(&self.func) }
    }
}

impl<V> fmt::Debug for Hook<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook").field("identity", &self.identity).finish_non_exhaustive()
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// The host capability the profiler observes.
///
/// All methods take `&self`: the profiler registers probes from inside a
/// running dispatch, so implementations use interior mutability.
pub trait Dispatcher {
    /// Value threaded through the callbacks of a dispatch.
    type Value;

    /// Register `hook` for `event` at `priority`.
    fn register_callback(&self, event: &str, priority: Priority, hook: Hook<Self::Value>);

    /// Name of the innermost event currently being dispatched.
    fn current_event_name(&self) -> Option<String>;

    /// Ascending, unique priorities holding at least one callback for `event`.
    fn list_registered_priorities(&self, event: &str) -> Vec<Priority>;

    /// Identities of the callbacks at `priority`, in run order.
    fn list_callbacks_at(&self, event: &str, priority: Priority) -> Vec<CallbackIdentity>;
}
