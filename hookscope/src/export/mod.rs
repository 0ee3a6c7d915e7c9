//! Report and trace export
//!
//! - [`json`]: the structured report as JSON, for tooling
//! - [`chrome_trace`]: every recorded span in Chrome Trace Event Format, for
//!   chrome://tracing, Perfetto or Speedscope

pub mod chrome_trace;
pub mod json;

pub use chrome_trace::ChromeTraceExporter;
pub use json::write_report_json;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::ExportError;

/// Create `path` and hand a buffered writer to `write`, naming `what` in
/// any error.
///
/// # Errors
/// Returns `ExportError::WriteFailed` if the file cannot be created or
/// flushed, or whatever `write` returns.
pub fn write_file<F>(path: &Path, what: &str, write: F) -> Result<(), ExportError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), ExportError>,
{
    let failed = |e: std::io::Error| ExportError::WriteFailed {
        what: format!("{what} ({})", path.display()),
        error: e.to_string(),
    };
    let file = File::create(path).map_err(failed)?;
    let mut writer = BufWriter::new(file);
    write(&mut writer)?;
    writer.flush().map_err(failed)
}
