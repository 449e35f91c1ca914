//! Integration tests for CLI config parsing and util helpers.

use std::path::{Path, PathBuf};

use hpsearch::config::EstimatorKind;
use hpsearch_cli::config::{load_tune_config, TuneConfig};
use hpsearch_cli::util::{tagged_path, validate_csv_file};

// ---------------------------------------------------------------------------
// validate_csv_file
// ---------------------------------------------------------------------------

#[test]
fn validate_csv_file_exists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("optdigits.csv");
    std::fs::File::create(&path).unwrap();
    assert!(validate_csv_file(path.to_str().unwrap()).is_ok());
}

#[test]
fn validate_optdigits_extensions() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["optdigits.tra", "optdigits.tes"] {
        let path = dir.path().join(name);
        std::fs::File::create(&path).unwrap();
        assert!(validate_csv_file(path.to_str().unwrap()).is_ok());
    }
}

#[test]
fn validate_wrong_extension_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.txt");
    std::fs::File::create(&path).unwrap();
    assert!(validate_csv_file(path.to_str().unwrap()).is_err());
}

#[test]
fn validate_nonexistent_file_errors() {
    assert!(validate_csv_file("/nonexistent/path/data.csv").is_err());
}

// ---------------------------------------------------------------------------
// TuneConfig loading
// ---------------------------------------------------------------------------

#[test]
fn load_tune_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tune.json");
    std::fs::write(
        &path,
        r#"{"estimator": "gbdt", "test_size": 0.25, "search": {"scoring": "f1_macro", "n_jobs": 4}}"#,
    )
    .unwrap();

    let cfg = load_tune_config(&path).unwrap();
    assert_eq!(cfg.estimator, EstimatorKind::Gbdt);
    assert_eq!(cfg.test_size, 0.25);
    assert_eq!(cfg.search.scoring, "f1_macro");
    assert_eq!(cfg.search.n_jobs, Some(4));
    // untouched sections keep their defaults
    assert!(cfg.search.refit);
    assert_eq!(cfg.random.n_iter, TuneConfig::default().random.n_iter);
}

#[test]
fn load_tune_config_invalid_json_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tune.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = load_tune_config(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to parse config"));
}

#[test]
fn load_tune_config_missing_file_errors() {
    assert!(load_tune_config("/nonexistent/tune.json").is_err());
}

// ---------------------------------------------------------------------------
// tagged_path
// ---------------------------------------------------------------------------

#[test]
fn tagged_path_inserts_tag_before_extension() {
    assert_eq!(
        tagged_path(Path::new("/tmp/report.html"), "precision_macro"),
        PathBuf::from("/tmp/report_precision_macro.html")
    );
}
