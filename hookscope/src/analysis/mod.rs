//! Analysis logic for profiling data
//!
//! This module turns the tracker's raw flow records into a ranked report,
//! separated from the HTML and text presentation layers.

pub mod report;

pub use report::{
    build_report, EventReport, PhaseBar, PriorityCallbacks, Report, SlowestEvent,
    UnattributedBar, DEFAULT_REPORT_LIMIT,
};
