use std::fs;
use std::process::{Command, Output};

use serde_json::Value;

fn opver(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_opver"))
        .args(args)
        .output()
        .expect("run opver")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf8")
}

#[test]
fn agreeing_scenarios_exit_cleanly() {
    for scenario in ["newton-sqrt", "largest-eigenvalue"] {
        let output = opver(&["run", "--scenario", scenario]);
        assert!(output.status.success(), "{scenario}: {}", stdout(&output));
        assert!(stdout(&output).contains("confirmed"));
    }
}

#[test]
fn shifted_square_reports_discrepancy() {
    let dir = tempfile::tempdir().unwrap();
    let output = opver(&[
        "run",
        "--scenario",
        "shifted-square",
        "--out",
        dir.path().to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    let body = stdout(&output);
    assert!(body.contains("evaluated, but evaluators disagree"));
    assert!(body.contains("10 of 10 probes"));

    let bytes = fs::read(dir.path().join("verification_report.json")).unwrap();
    let report: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(report["verdict"]["outcome"], "discrepancy-detected");
    assert_eq!(report["summary"]["support"].as_array().unwrap().len(), 10);
}

#[test]
fn invalid_config_fails_distinctly() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("empty_domain.yaml");
    fs::write(&config, "domain:\n  dimension: 1\n  target_probe_count: 0\n").unwrap();
    let output = opver(&[
        "run",
        "--scenario",
        "shifted-square",
        "--config",
        config.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    let body = stdout(&output);
    assert!(body.contains("could not evaluate"));
    assert!(!body.contains("evaluators disagree"));
}

#[test]
fn unknown_scenario_is_rejected() {
    let output = opver(&["run", "--scenario", "nope"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("newton-sqrt"));
}

#[test]
fn bound_prints_compounded_value() {
    let output = opver(&[
        "bound",
        "--reference-bits",
        "4",
        "--candidate-bits",
        "8",
        "--trials",
        "2",
    ]);
    assert!(output.status.success());
    let body = stdout(&output);
    assert!(body.contains("(2^-4)"));
    assert!(body.contains("(2^-8)"));
}

#[test]
fn domain_prints_grid_json() {
    let output = opver(&["domain", "--dimension", "2", "--count", "10"]);
    assert!(output.status.success());
    let value: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["points"].as_array().unwrap().len(), 9);
    assert_eq!(value["points_per_axis"], 3);

    let seeded = opver(&["domain", "--dimension", "2", "--count", "10", "--seed", "3"]);
    let value: Value = serde_json::from_str(&stdout(&seeded)).unwrap();
    assert_eq!(value["points"].as_array().unwrap().len(), 10);
}
