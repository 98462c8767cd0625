use bsew::core::clock::FixedClock;
use bsew::engine::config::ExperimentConfigBuilder;
use bsew::engine::processes::time_course::REPORT_FILE_NAME;
use bsew::engine::progress::ProgressReporter;
use bsew::engine::registry::ProcessRegistry;
use bsew::workflows::run::run;
use chrono::DateTime;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const TOLERANCE: f64 = 5e-10;

fn resource(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/resources")
        .join(name)
}

fn read_table(path: &Path) -> (Vec<String>, Vec<Vec<f64>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let header = reader
        .headers()
        .unwrap()
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|record| {
            record
                .unwrap()
                .iter()
                .map(|cell| cell.parse::<f64>().unwrap())
                .collect()
        })
        .collect();
    (header, rows)
}

#[test]
fn uniform_time_course_matches_reference_report() {
    let workspace = tempdir().unwrap();
    let report_dir = workspace.path().join("report");
    let output_dir = workspace.path().join("output");
    let input = workspace.path().join("decay.pbif");

    let schema = json!({
        "state": {
            "time_course": {
                "_type": "step",
                "address": "local:uniform-time-course",
                "config": {
                    "model_source": resource("decay.model.json"),
                    "time": 10.0,
                    "n_points": 51,
                    "output_dir": report_dir
                },
                "outputs": {"results": ["results"]}
            }
        }
    });
    fs::write(&input, serde_json::to_string_pretty(&schema).unwrap()).unwrap();

    let config = ExperimentConfigBuilder::new()
        .input_file(input)
        .output_dir(output_dir.clone())
        .interval(1.0)
        .build()
        .unwrap();
    let clock = FixedClock(DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z").unwrap());

    let outcome = run(
        &config,
        &ProcessRegistry::with_builtins(),
        &clock,
        &ProgressReporter::new(),
    )
    .unwrap();

    assert!(outcome.results_file.is_none());
    assert!(outcome.state_file.is_file());
    assert!(output_dir.join("decay.pbif").is_file());

    let (expected_header, expected) = read_table(&resource("decay_report.csv"));
    let (actual_header, actual) = read_table(&report_dir.join(REPORT_FILE_NAME));
    assert_eq!(actual_header, expected_header);
    assert_eq!(actual.len(), expected.len());
    for (row, (want, got)) in expected.iter().zip(&actual).enumerate() {
        for (col, (w, g)) in want.iter().zip(got).enumerate() {
            assert!(
                (w - g).abs() <= TOLERANCE,
                "row {row}, column {}: expected {w}, got {g}",
                expected_header[col]
            );
        }
    }

    let state: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&outcome.state_file).unwrap()).unwrap();
    let saved_b = state["state"]["results"]["B"].as_array().unwrap();
    assert_eq!(saved_b.len(), 51);
}
