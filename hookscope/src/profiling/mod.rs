//! Profiling core
//!
//! This module contains the timing-attribution engine:
//! - Invocation frames and the per-event flow records they feed
//! - The tracker state machine (start / phase boundary / stop)
//! - Probe injection into the host dispatcher
//! - The request-scoped profiler handle tying it together

pub mod flow;
pub mod frame;
pub mod probes;
pub mod profiler;
pub mod tracker;

// Re-export common types
pub use flow::{FlowRecord, FlowTable, Interval};
pub use frame::InvocationFrame;
pub use probes::PROBE_TYPE;
pub use profiler::{Profiler, ProfilerConfig};
pub use tracker::Tracker;
