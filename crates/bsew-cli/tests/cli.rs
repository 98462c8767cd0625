use serde_json::{Value, json};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

const USAGE_MESSAGE: &str =
    "error: `input_file_path` must be a JSON/PBIF file (or an archive containing one) that exists!";

fn bsew(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bsew"))
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("failed to launch bsew")
}

fn decay_experiment() -> Value {
    json!({
        "state": {
            "species": {"A": 2.0},
            "decay": {
                "_type": "process",
                "address": "local:decay",
                "config": {"rates": {"A": 0.5}},
                "inputs": {"species": ["species"]},
                "outputs": {"species": ["species"]}
            },
            "emitter": {
                "_type": "step",
                "address": "local:ram-emitter",
                "inputs": {"species": ["species"]}
            }
        }
    })
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn write_archive(path: &Path, entries: &[(&str, &[u8])]) {
    let mut zip = zip::ZipWriter::new(fs::File::create(path).unwrap());
    for (name, content) in entries {
        zip.start_file(*name, zip::write::FileOptions::default())
            .unwrap();
        zip.write_all(content).unwrap();
    }
    zip.finish().unwrap();
}

#[test]
fn missing_input_exits_with_usage_status() {
    let dir = tempdir().unwrap();
    let output = bsew(&["absent.omex", "-o", "out", "-q"], dir.path());

    assert_eq!(output.status.code(), Some(11));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(USAGE_MESSAGE), "stderr was: {stderr}");
    assert!(!dir.path().join("out").exists());
}

#[test]
fn missing_input_is_reported_before_other_flags_are_used() {
    let dir = tempdir().unwrap();
    let output = bsew(
        &["absent.omex", "-S", "run.interval=fast", "--log-file", "run.log", "-c", "nope.toml"],
        dir.path(),
    );

    assert_eq!(output.status.code(), Some(11));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(USAGE_MESSAGE), "stderr was: {stderr}");
    assert!(file_names(dir.path()).is_empty());
}

#[test]
fn zero_interval_exits_with_usage_status() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("exp.pbif"), decay_experiment().to_string()).unwrap();

    let output = bsew(&["exp.pbif", "-n", "0"], dir.path());

    assert_eq!(output.status.code(), Some(11));
    assert_eq!(file_names(dir.path()), vec!["exp.pbif"]);
}

#[test]
fn outputs_default_to_the_input_directory() {
    let dir = tempdir().unwrap();
    let experiments = dir.path().join("experiments");
    fs::create_dir(&experiments).unwrap();
    fs::write(experiments.join("exp.pbif"), decay_experiment().to_string()).unwrap();

    let output = bsew(&["experiments/exp.pbif", "-n", "3", "-q"], dir.path());

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let names = file_names(&experiments);
    assert_eq!(names.len(), 3, "unexpected files: {names:?}");
    assert!(names.iter().any(|n| n.starts_with("results_") && n.ends_with(".pber")));
    assert!(names.iter().any(|n| n.starts_with("state_") && n.ends_with(".pbg")));

    let results_name = names.iter().find(|n| n.starts_with("results_")).unwrap();
    let results: Value =
        serde_json::from_str(&fs::read_to_string(experiments.join(results_name)).unwrap())
            .unwrap();
    let records = results["emitter"].as_array().unwrap();
    assert_eq!(records.len(), 4);
    let final_a = records[3]["species"]["A"].as_f64().unwrap();
    assert!((final_a - 2.0 * (-1.5f64).exp()).abs() < 1e-9);
}

#[test]
fn archive_without_schema_exits_with_schema_status() {
    let dir = tempdir().unwrap();
    write_archive(
        &dir.path().join("bundle.omex"),
        &[("manifest.xml", &b"<omexManifest/>"[..])],
    );

    let output = bsew(&["bundle.omex", "-o", "out"], dir.path());

    assert_eq!(output.status.code(), Some(12));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Could not find any PBIF or JSON file"), "stderr was: {stderr}");
    assert!(!dir.path().join("out").exists());
}

#[test]
fn unknown_process_exits_with_engine_status() {
    let dir = tempdir().unwrap();
    let schema = json!({"state": {"p": {"_type": "process", "address": "local:missing"}}});
    fs::write(dir.path().join("exp.json"), schema.to_string()).unwrap();

    let output = bsew(&["exp.json", "-o", "out", "-q"], dir.path());

    assert_eq!(output.status.code(), Some(13));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn config_file_supplies_interval_and_output() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("exp.pbif"), decay_experiment().to_string()).unwrap();
    fs::write(
        dir.path().join("bsew.toml"),
        "[run]\ninterval = 2.0\n[output]\ndirectory = \"from-config\"\n",
    )
    .unwrap();

    let output = bsew(&["exp.pbif", "-c", "bsew.toml", "-q"], dir.path());

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let state_name = file_names(&dir.path().join("from-config"))
        .into_iter()
        .find(|n| n.starts_with("state_"))
        .unwrap();
    let state: Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("from-config").join(state_name)).unwrap(),
    )
    .unwrap();
    assert_eq!(state["global_time"], json!(2.0));
}
