//! # hookscope - Request Lifecycle Profiler for Hook Dispatchers
//!
//! hookscope measures where a request spends its time inside a
//! priority-ordered, re-entrant event/hook dispatcher. It attaches to the
//! dispatcher as an ordinary callback, needs no cooperation from the code
//! being measured, and reports per-event totals broken down by priority.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  Host Dispatcher (impl Dispatcher)              │
//! │        dispatch("render") ─► "all" observers ─► callbacks       │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │ sentinel probes fire as callbacks
//!                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   hookscope (This Crate)                        │
//! │                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐         │
//! │  │    Probes    │──▶│   Tracker    │──▶│  Flow Table  │         │
//! │  │ start/phase/ │   │ (frame stack)│   │ (per event)  │         │
//! │  │     stop     │   └──────────────┘   └──────┬───────┘         │
//! │  └──────────────┘                             │                 │
//! │                                               ▼                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐         │
//! │  │    Export    │◀──│   Analysis   │──▶│    Render    │         │
//! │  │ (json/trace) │   │   (Report)   │   │ (html/text)  │         │
//! │  └──────────────┘   └──────────────┘   └──────────────┘         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! ### Core Pipeline Modules
//!
//! - [`profiling`]: sentinel probes, the invocation stack and flow records
//!   - `probes`: install start/phase/stop callbacks around an event
//!   - `tracker`: START → PHASE* → STOP state machine with nested-time subtraction
//!   - `flow`: per-event intervals and per-priority phase durations
//!
//! - [`analysis`]: rank events by exclusive time and lay out phase bars
//!
//! - [`render`]: HTML fragment for a debug panel, fixed-width text table
//!
//! - [`export`]: report JSON and Chrome Trace Event Format
//!   - Compatible with Perfetto, Speedscope, Chrome's `chrome://tracing`
//!
//! ### Host and Replay Modules
//!
//! - [`dispatch`]: the [`dispatch::Dispatcher`] contract and a reference
//!   [`dispatch::HookRegistry`]
//!
//! - [`scenario`]: describe a request as JSON and replay it deterministically
//!
//! - [`clock`]: monotonic and manual time sources
//!
//! - [`cli`]: command-line argument parsing
//!
//! - [`domain`]: core domain types (Timestamp, Duration, errors)
//!
//! ## Typical Usage
//!
//! ```bash
//! # Replay a scenario and print the report
//! hookscope request.json
//!
//! # Also write the HTML panel and a trace for Perfetto
//! hookscope request.json --html panel.html --trace trace.json
//! ```
//!
//! ## Key Concepts
//!
//! - **Event**: a named hook point; dispatching it runs its callbacks in priority order
//! - **Sentinel priorities**: `First` and `Last` bracket every numbered priority
//! - **Phase**: the slice of one invocation spent at one priority
//! - **Exclusive time**: an event's time minus the time of events nested inside it

pub mod analysis;
pub mod cli;
pub mod clock;
pub mod dispatch;
pub mod domain;
pub mod export;
pub mod profiling;
pub mod render;
pub mod scenario;
