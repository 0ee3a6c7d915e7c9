//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

use crate::analysis::DEFAULT_REPORT_LIMIT;
use crate::profiling::ProfilerConfig;

#[derive(Parser)]
#[command(
    name = "hookscope",
    about = "Profile where a request spends its time across hook dispatches",
    after_help = "\
EXAMPLES:
    hookscope request.json                         Print the report
    hookscope request.json --html panel.html       Also write the HTML panel
    hookscope request.json --trace trace.json -q   Only write a Perfetto trace"
)]
pub struct Args {
    /// Scenario file describing events, callbacks and the run order
    #[arg(value_name = "SCENARIO")]
    pub scenario: PathBuf,

    /// Write the HTML report fragment to FILE
    #[arg(long, value_name = "FILE")]
    pub html: Option<PathBuf>,

    /// Write the structured report as JSON to FILE
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Write recorded spans in Chrome Trace Event Format to FILE
    #[arg(long, value_name = "FILE")]
    pub trace: Option<PathBuf>,

    /// Number of events shown in detail
    #[arg(long, default_value_t = DEFAULT_REPORT_LIMIT)]
    pub limit: usize,

    /// Show callbacks and phase bars under each event
    #[arg(short, long)]
    pub details: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    #[must_use]
    pub fn profiler_config(&self) -> ProfilerConfig {
        ProfilerConfig { report_limit: self.limit, ..ProfilerConfig::default() }
    }
}
