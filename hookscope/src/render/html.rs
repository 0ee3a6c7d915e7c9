//! HTML fragment rendering.
//!
//! Layout:
//!
//! ```text
//! <div id="hookscope-container">
//!   <h2>Unique events / Total events / Execution time / Slowest event</h2>
//!   <table>
//!     <tr>            event │ callbacks │ calls │ per call │ total
//!     <tr.details>    callbacks by priority │ phase bars
//!   </table>
//!   <style> <script>
//! </div>
//! ```
//!
//! Clicking a row toggles its details row. Bars are absolutely positioned
//! spans whose `left`/`width` come straight from the report percentages.

use std::fmt::Write;

use crate::analysis::{EventReport, Report};

const CONTAINER_ID: &str = "hookscope-container";

const STYLE: &str = r"<style>
#hookscope-container table { border-spacing: 0; width: 100%; }
#hookscope-container td, #hookscope-container th { padding: 6px; border-bottom: solid 1px #ddd; }
#hookscope-container td { font: 12px Monaco, 'Courier New', Courier, monospace; line-height: 180%; cursor: pointer; vertical-align: top; }
#hookscope-container tr:hover { background: #e8e8e8; }
#hookscope-container th { font-weight: 600; }
#hookscope-container th.num, #hookscope-container td.num { text-align: right; }
#hookscope-container h2 span { color: #777; font-weight: normal; }
#hookscope-container h3 { clear: both; font-size: 22px; margin: 15px 10px 15px 0; }
#hookscope-container ol.hookscope-callbacks { list-style: decimal; padding-left: 50px; color: #777; margin-top: 10px; }
#hookscope-container .hookscope-event:before { content: '\25B8'; display: inline-block; color: #aaa; margin-right: 4px; }
#hookscope-container .hookscope-expanded .hookscope-event:before { content: '\25BE'; }
#hookscope-container tr.details { display: none; }
#hookscope-container .hookscope-expanded + tr.details { display: table-row; }
#hookscope-container .hookscope-results li { position: relative; }
#hookscope-container .hookscope-results li span { position: absolute; top: 0; bottom: 0; left: 0; background: red; outline: red dotted 2px; }
#hookscope-container .hookscope-results li span.other { background: blue; outline: blue dotted 2px; }
</style>";

const SCRIPT: &str = r"<script>
(function () {
  var container = document.getElementById('hookscope-container');
  if (!container) { return; }
  container.addEventListener('click', function (e) {
    var cell = e.target.closest('td');
    if (!cell) { return; }
    var row = cell.parentElement;
    if (row.classList.contains('details')) { row = row.previousElementSibling; }
    if (row) { row.classList.toggle('hookscope-expanded'); }
  });
})();
</script>";

/// Render `report` as a self-contained HTML fragment.
#[must_use]
pub fn render_html(report: &Report) -> String {
    let mut out = String::new();
    let _ = write!(out, "<div id=\"{CONTAINER_ID}\">");

    let _ = write!(out, "<h2><span>Unique events:</span> {}</h2>", report.unique_events);
    let _ = write!(out, "<h2><span>Total events:</span> {}</h2>", report.total_calls);
    let _ = write!(out, "<h2><span>Execution time:</span> {:.2}ms</h2>", report.total_ms);
    let _ = write!(out, "<h2><span>Slowest event:</span> {:.2}ms</h2>", report.slowest_ms());
    out.push_str("<h3>Slow Events</h3>");

    out.push_str("<table><tr>");
    out.push_str("<th>Event</th>");
    out.push_str("<th class=\"num\">Callbacks</th>");
    out.push_str("<th class=\"num\">Calls</th>");
    out.push_str("<th class=\"num\">Per Call</th>");
    out.push_str("<th class=\"num\">Total</th>");
    out.push_str("</tr>");
    for event in &report.events {
        render_event(&mut out, event);
    }
    out.push_str("</table>");

    out.push_str(STYLE);
    out.push_str(SCRIPT);
    out.push_str("</div>");
    out
}

fn render_event(out: &mut String, event: &EventReport) {
    let _ = write!(
        out,
        "<tr><td><span class=\"hookscope-event\">{}</span></td>\
         <td class=\"num\">{}</td><td class=\"num\">{}</td>\
         <td class=\"num\">{:.2}ms</td><td class=\"num\">{:.2}ms</td></tr>",
        escape(&event.event_name),
        event.callback_count,
        event.call_count,
        event.per_call_ms,
        event.total_ms,
    );

    out.push_str("<tr class=\"details\"><td><ol class=\"hookscope-callbacks\">");
    for group in &event.callbacks {
        for callback in &group.callbacks {
            let _ = write!(
                out,
                "<li data-priority=\"{}\">{}</li>",
                escape(&group.priority.to_string()),
                escape(&callback.to_string())
            );
        }
    }
    out.push_str("</ol></td><td colspan=\"4\"><ol class=\"hookscope-results\">");

    // One list line per callback so each bar lines up with its batch
    for phase in &event.phases {
        let spacer = vec!["&nbsp;"; phase.callback_count.max(1)].join("<br>");
        let _ = write!(
            out,
            "<li>{spacer} <span style=\"left: {:.4}%; width: {:.4}%;\" title=\"{}: {:.4}ms\"></span></li>",
            phase.offset_pct,
            phase.width_pct,
            escape(&phase.priority.to_string()),
            phase.duration_ms,
        );
    }
    let other = &event.unattributed;
    let _ = write!(
        out,
        "<li>&nbsp; <span class=\"other\" style=\"left: {:.4}%; width: {:.4}%;\" title=\"unattributed: {:.4}ms\"></span></li>",
        other.offset_pct, other.width_pct, other.duration_ms,
    );
    out.push_str("</ol></td></tr>");
}

/// Minimal HTML escaping for text and attribute values.
fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{PhaseBar, PriorityCallbacks, SlowestEvent, UnattributedBar};
    use crate::dispatch::{CallbackIdentity, Priority};

    fn sample_report() -> Report {
        Report {
            unique_events: 1,
            total_calls: 1,
            total_ms: 5.0,
            slowest: Some(SlowestEvent { event_name: "init".to_string(), total_ms: 5.0 }),
            events: vec![EventReport {
                event_name: "init<script>".to_string(),
                call_count: 1,
                total_ms: 5.0,
                per_call_ms: 5.0,
                callback_count: 1,
                callbacks: vec![PriorityCallbacks {
                    priority: Priority::At(10),
                    callbacks: vec![CallbackIdentity::bound("Theme", "setup")],
                }],
                phases: vec![PhaseBar {
                    priority: Priority::At(10),
                    duration_ms: 4.0,
                    callback_count: 1,
                    offset_pct: 0.0,
                    width_pct: 80.0,
                }],
                unattributed: UnattributedBar {
                duration_ms: 1.0,
                offset_pct: 80.0,
                width_pct: 20.0,
            },
            }],
        }
    }

    #[test]
    fn test_headline_and_row_values() {
        let html = render_html(&sample_report());
        assert!(html.contains("<h2><span>Unique events:</span> 1</h2>"));
        assert!(html.contains("<h2><span>Slowest event:</span> 5.00ms</h2>"));
        assert!(html.contains("<td class=\"num\">5.00ms</td>"));
        assert!(html.contains("<li data-priority=\"10\">Theme::setup</li>"));
    }

    #[test]
    fn test_bars_use_report_percentages() {
        let html = render_html(&sample_report());
        assert!(html.contains("left: 0.0000%; width: 80.0000%;"));
        assert!(html.contains("class=\"other\" style=\"left: 80.0000%; width: 20.0000%;\""));
    }

    #[test]
    fn test_event_names_are_escaped() {
        let html = render_html(&sample_report());
        assert!(html.contains("init&lt;script&gt;"));
        assert!(!html.contains("init<script>"));
    }

    #[test]
    fn test_empty_report_renders_headline_only() {
        let report = Report {
            unique_events: 0,
            total_calls: 0,
            total_ms: 0.0,
            slowest: None,
            events: vec![],
        };
        let html = render_html(&report);
        assert!(html.contains("<h2><span>Slowest event:</span> 0.00ms</h2>"));
        assert!(!html.contains("class=\"details\""));
    }
}
