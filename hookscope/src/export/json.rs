//! JSON export of the structured report.

use std::io::Write;

use crate::analysis::Report;
use crate::domain::ExportError;

/// Write `report` as pretty-printed JSON.
///
/// # Errors
/// Returns an error if serialization or the underlying writer fails.
pub fn write_report_json<W: Write>(report: &Report, writer: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{EventReport, PriorityCallbacks, SlowestEvent, UnattributedBar};
    use crate::dispatch::{CallbackIdentity, Priority};

    #[test]
    fn test_report_json_shape() {
        let report = Report {
            unique_events: 1,
            total_calls: 3,
            total_ms: 6.0,
            slowest: Some(SlowestEvent { event_name: "init".to_string(), total_ms: 6.0 }),
            events: vec![EventReport {
                event_name: "init".to_string(),
                call_count: 3,
                total_ms: 6.0,
                per_call_ms: 2.0,
                callback_count: 1,
                callbacks: vec![PriorityCallbacks {
                    priority: Priority::At(10),
                    callbacks: vec![CallbackIdentity::Anonymous(7)],
                }],
                phases: vec![],
                unattributed: UnattributedBar {
                    duration_ms: 6.0,
                    offset_pct: 0.0,
                    width_pct: 100.0,
                },
            }],
        };

        let mut buffer = Vec::new();
        write_report_json(&report, &mut buffer).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

        assert_eq!(parsed["total_calls"], 3);
        assert_eq!(parsed["slowest"]["event_name"], "init");
        let event = &parsed["events"][0];
        assert_eq!(event["per_call_ms"], 2.0);
        assert_eq!(event["callbacks"][0]["priority"]["at"], 10);
        assert_eq!(event["callbacks"][0]["callbacks"][0]["kind"], "anonymous");
        assert_eq!(event["callbacks"][0]["callbacks"][0]["value"], 7);
    }
}
