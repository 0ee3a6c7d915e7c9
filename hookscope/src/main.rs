//! # hookscope - Main Entry Point
//!
//! Replays a scenario file against the reference dispatcher with a profiler
//! attached, prints the text report and writes any requested outputs:
//! - `--html FILE`: report fragment for a debug panel
//! - `--json FILE`: structured report
//! - `--trace FILE`: Chrome Trace Event Format for Perfetto/Speedscope

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use hookscope::cli::Args;
use hookscope::domain::ScenarioError;
use hookscope::export::{self, write_report_json, ChromeTraceExporter};
use hookscope::render::{render_html, render_text, TextOptions};
use hookscope::scenario::{self, Scenario};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_DATAERR: i32 = 65;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ScenarioError>() {
        Some(ScenarioError::Io(_)) | None => EXIT_ERROR,
        Some(_) => EXIT_DATAERR,
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let quiet = args.quiet;

    let scenario = Scenario::from_path(&args.scenario)
        .with_context(|| format!("Failed to load scenario {}", args.scenario.display()))?;
    if !quiet {
        println!("hookscope v{}", env!("CARGO_PKG_VERSION"));
        println!("scenario: {}", scenario.name.as_deref().unwrap_or("unnamed"));
        println!();
    }

    let replay = scenario::replay(&scenario, args.profiler_config())?;
    let report = replay.profiler.build_report();
    info!("{} events recorded, {} reported", report.unique_events, report.events.len());

    if !quiet {
        let options = TextOptions { details: args.details, ..TextOptions::default() };
        print!("{}", render_text(&report, options));
    }

    if let Some(path) = &args.html {
        export::write_file(path, "HTML report", |w| {
            w.write_all(render_html(&report).as_bytes())?;
            Ok(())
        })?;
        if !quiet {
            println!("saved: {}", path.display());
        }
    }

    if let Some(path) = &args.json {
        export::write_file(path, "JSON report", |w| write_report_json(&report, w))?;
        if !quiet {
            println!("saved: {}", path.display());
        }
    }

    if let Some(path) = &args.trace {
        let exporter = ChromeTraceExporter::from_flows(replay.profiler.tracker().flows());
        export::write_file(path, "trace", |w| exporter.export(w))
            .context("Failed to export trace")?;
        if !quiet {
            println!("saved: {} ({} spans)", path.display(), exporter.event_count());
        }
    }

    Ok(())
}
