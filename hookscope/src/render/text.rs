//! Terminal rendering.
//!
//! ```text
//! Unique events:    2
//! Total events:     2
//! Execution time:   10.00ms
//! Slowest event:    render (7.00ms)
//!
//! EVENT                     CALLBACKS  CALLS   PER CALL      TOTAL
//! render                            1      1     7.00ms     7.00ms
//!     @10    7.00ms 100.0%  ████████████████████
//! ```

// Bar lengths are computed from percentages
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]

use std::fmt::Write;

use crate::analysis::{EventReport, Report};

const NAME_WIDTH: usize = 24;

#[derive(Debug, Clone, Copy)]
pub struct TextOptions {
    /// Print the per-priority breakdown under each event.
    pub details: bool,
    /// Characters used by a 100% bar.
    pub bar_width: usize,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self { details: false, bar_width: 20 }
    }
}

#[must_use]
pub fn render_text(report: &Report, options: TextOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Unique events:    {}", report.unique_events);
    let _ = writeln!(out, "Total events:     {}", report.total_calls);
    let _ = writeln!(out, "Execution time:   {:.2}ms", report.total_ms);
    match &report.slowest {
        Some(slowest) => {
            let _ = writeln!(
                out,
                "Slowest event:    {} ({:.2}ms)",
                slowest.event_name, slowest.total_ms
            );
        }
        None => {
            let _ = writeln!(out, "Slowest event:    -");
        }
    }

    if report.events.is_empty() {
        return out;
    }

    let _ = writeln!(
        out,
        "\n{:<NAME_WIDTH$} {:>9} {:>6} {:>10} {:>10}",
        "EVENT", "CALLBACKS", "CALLS", "PER CALL", "TOTAL"
    );
    for event in &report.events {
        write_row(&mut out, event);
        if options.details {
            write_details(&mut out, event, options.bar_width);
        }
    }
    out
}

fn write_row(out: &mut String, event: &EventReport) {
    let _ = writeln!(
        out,
        "{:<NAME_WIDTH$} {:>9} {:>6} {:>8.2}ms {:>8.2}ms",
        truncate(&event.event_name, NAME_WIDTH),
        event.callback_count,
        event.call_count,
        event.per_call_ms,
        event.total_ms,
    );
}

fn write_details(out: &mut String, event: &EventReport, bar_width: usize) {
    for phase in &event.phases {
        let _ = writeln!(
            out,
            "    @{:<6} {:>8.2}ms {:>6.1}%  {}",
            phase.priority.to_string(),
            phase.duration_ms,
            phase.width_pct,
            bar(phase.width_pct, bar_width),
        );
    }
    let other = &event.unattributed;
    let _ = writeln!(
        out,
        "    {:<7} {:>8.2}ms {:>6.1}%  {}",
        "other",
        other.duration_ms,
        other.width_pct,
        bar(other.width_pct, bar_width),
    );
}

/// A `width`-character bar filled to `pct` (clamped for display only).
fn bar(pct: f64, width: usize) -> String {
    let filled = ((pct.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let mut s = "█".repeat(filled.min(width));
    s.push_str(&"░".repeat(width - filled.min(width)));
    s
}

fn truncate(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        name.to_string()
    } else {
        let mut short: String = name.chars().take(max - 1).collect();
        short.push('…');
        short
    }
}
