//! Host dispatcher contract and an in-process reference implementation
//!
//! The profiler only talks to the [`Dispatcher`] trait (defined in
//! `hookscope-common` so hosts can implement it without pulling in the
//! profiler). [`HookRegistry`] is a complete single-threaded dispatcher used
//! by scenario replay and the test suite.

pub mod registry;

pub use hookscope_common::{CallbackIdentity, Dispatcher, Hook, Priority, ALL_EVENTS};
pub use registry::HookRegistry;
