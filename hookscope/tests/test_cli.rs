use std::path::PathBuf;
use std::process::Command;

use hookscope::profiling::ProfilerConfig;
use hookscope::scenario::{self, Scenario};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

#[test]
fn test_fixture_replay_matches_expected_totals() {
    let scenario = Scenario::from_path(fixture("nested_render.json")).unwrap();
    let replay = scenario::replay(&scenario, ProfilerConfig::default()).unwrap();
    let report = replay.profiler.build_report();

    let order: Vec<&str> = report.events.iter().map(|e| e.event_name.as_str()).collect();
    assert_eq!(order, ["render", "init", "partial"]);
    assert_eq!(report.event("render").unwrap().total_ms, 7.0);
    assert_eq!(report.event("partial").unwrap().total_ms, 3.0);
    assert_eq!(report.event("init").unwrap().per_call_ms, 5.0);
    assert_eq!(report.total_ms, 15.0);
    assert_eq!(report.total_calls, 3);
}

#[test]
fn test_cli_prints_report_and_writes_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let html = dir.path().join("panel.html");
    let json = dir.path().join("report.json");
    let trace = dir.path().join("trace.json");

    let output = Command::new(env!("CARGO_BIN_EXE_hookscope"))
        .arg(fixture("nested_render.json"))
        .arg("--html")
        .arg(&html)
        .arg("--json")
        .arg(&json)
        .arg("--trace")
        .arg(&trace)
        .output()
        .expect("Failed to run hookscope");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Slowest event:    render (7.00ms)"));
    assert!(stdout.contains("Execution time:   15.00ms"));

    let html = std::fs::read_to_string(&html).unwrap();
    assert!(html.starts_with("<div id=\"hookscope-container\">"));
    assert!(html.contains("Theme::render"));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(report["events"][0]["event_name"], "render");

    let trace: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&trace).unwrap()).unwrap();
    // three spans plus the thread name
    assert_eq!(trace["traceEvents"].as_array().unwrap().len(), 4);
}

#[test]
fn test_cli_quiet_prints_nothing() {
    let output = Command::new(env!("CARGO_BIN_EXE_hookscope"))
        .arg(fixture("nested_render.json"))
        .arg("--quiet")
        .output()
        .expect("Failed to run hookscope");

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_cli_rejects_cyclic_scenario() {
    let output = Command::new(env!("CARGO_BIN_EXE_hookscope"))
        .arg(fixture("cycle.json"))
        .output()
        .expect("Failed to run hookscope");

    assert_eq!(output.status.code(), Some(65));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Nested dispatch deeper than 64 levels"));
}

#[test]
fn test_cli_missing_scenario_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_hookscope"))
        .arg(dir.path().join("absent.json"))
        .output()
        .expect("Failed to run hookscope");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load scenario"));
}
