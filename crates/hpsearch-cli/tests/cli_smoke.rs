//! CLI binary smoke tests using assert_cmd.
//!
//! These tests exercise the compiled `hpsearch` binary to verify that
//! argument parsing, help text, and error handling work end-to-end.

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("hpsearch").unwrap()
}

/// Small KNN search over synthetic digits so the binary finishes quickly.
const KNN_CONFIG: &str = r#"{
    "estimator": "knn",
    "data": {"n_per_class": 6},
    "search": {"cv": {"type": "stratified_k_fold", "n_splits": 3}},
    "grid": {
        "param_grid": [{"n_neighbors": [1, 3]}],
        "scores": ["accuracy"]
    },
    "random": {
        "param_distributions": [{"n_neighbors": {"dist": "randint", "low": 1, "high": 5}}],
        "n_iter": 3,
        "random_state": 0,
        "n_top": 2
    }
}"#;

fn write_config(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("tune.json");
    std::fs::write(&path, KNN_CONFIG).unwrap();
    path
}

// ---------------------------------------------------------------------------
// Top-level
// ---------------------------------------------------------------------------

#[test]
fn no_args_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_flag() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("grid"))
        .stdout(predicate::str::contains("random"));
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hpsearch"));
}

// ---------------------------------------------------------------------------
// Search subcommands
// ---------------------------------------------------------------------------

#[test]
fn grid_nonexistent_config_errors() {
    cmd()
        .args(["grid", "/nonexistent/tune.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read config"))
        .stderr(predicate::str::contains("Error: ").not());
}

#[test]
fn random_invalid_config_is_logged() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("tune.json");
    std::fs::write(&config, "{ not json").unwrap();
    cmd()
        .args(["random", config.to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed"))
        .stderr(predicate::str::contains("Failed to parse config"));
}

#[test]
fn grid_rejects_data_with_wrong_extension() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("digits.txt");
    std::fs::write(&data, "0,0\n").unwrap();
    cmd()
        .args(["grid", "--data", data.to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(".csv"));
}

#[test]
fn random_rejects_unknown_estimator() {
    cmd()
        .args(["random", "--estimator", "forest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("forest"));
}

#[test]
fn grid_prints_summary_and_writes_results() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir);
    let output = dir.path().join("cv_results.csv");

    cmd()
        .args(["grid", config.to_str().unwrap(), "--output", output.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Tuning hyper-parameters for accuracy"))
        .stdout(predicate::str::contains("Detailed classification report:"));

    let csv = std::fs::read_to_string(&output).unwrap();
    assert!(csv.starts_with("mean_fit_time"));
    assert_eq!(csv.lines().count(), 3);
}

#[test]
fn random_lists_top_ranked_models() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir);

    cmd()
        .args(["random", config.to_str().unwrap(), "--n-jobs", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("RandomizedSearchCV took"))
        .stdout(predicate::str::contains("Model with rank: 1"));
}
