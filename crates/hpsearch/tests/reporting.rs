use hpsearch::config::SearchConfig;
use hpsearch::cross_validation::CvStrategy;
use hpsearch::io::write_cv_results_csv;
use hpsearch::models::KNeighborsClassifier;
use hpsearch::params::{ParamGrid, ParamValue};
use hpsearch::report::html::render_search_report;
use hpsearch::report::{write_search_summary, write_top_ranked};
use hpsearch::search::{GridSearchCV, HyperSearch};
use ndarray::{Array1, Array2};

fn two_blobs(n: usize) -> (Array2<f64>, Array1<usize>) {
    let x = Array2::from_shape_fn((n, 2), |(i, j)| {
        let centre = if i % 2 == 0 { 0.0 } else { 6.0 };
        centre + ((i * 7 + j * 3) % 5) as f64 * 0.3
    });
    let y = Array1::from_shape_fn(n, |i| i % 2);
    (x, y)
}

fn fitted_search() -> GridSearchCV {
    let (x, y) = two_blobs(30);
    let mut grid = ParamGrid::new();
    grid.insert(
        "n_neighbors".to_string(),
        vec![ParamValue::Int(1), ParamValue::Int(3)],
    );
    let mut search = GridSearchCV::new(
        Box::new(KNeighborsClassifier::default()),
        vec![grid],
        SearchConfig::new(CvStrategy::folds(3), "precision_macro"),
    )
    .unwrap();
    search.fit(&x, &y).unwrap();
    search
}

#[test]
fn test_search_summary_sections() {
    let search = fitted_search();
    let (x_test, y_test) = two_blobs(10);
    let mut out = Vec::new();
    write_search_summary(&mut out, &search, &x_test, &y_test).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.starts_with("# Tuning hyper-parameters for precision_macro"));
    assert!(text.contains("Best parameters set found on development set:\n\n{'n_neighbors': 1}"));
    assert!(text.contains("1.000 (+/-0.000) for {'n_neighbors': 1}"));
    assert!(text.contains("1.000 (+/-0.000) for {'n_neighbors': 3}"));
    assert!(text.contains("weighted avg       1.00      1.00      1.00        10"));
}

#[test]
fn test_top_ranked_lists_ties() {
    let search = fitted_search();
    let mut out = Vec::new();
    write_top_ranked(&mut out, search.cv_results().unwrap(), 3).unwrap();
    let text = String::from_utf8(out).unwrap();
    // both candidates are perfect and share rank 1
    assert_eq!(text.matches("Model with rank: 1").count(), 2);
    assert!(text.contains("Mean validation score: 1.000 (std: 0.000)"));
}

#[test]
fn test_exports() {
    let search = fitted_search();
    let dir = tempfile::tempdir().unwrap();

    let csv_path = dir.path().join("cv_results.csv");
    write_cv_results_csv(&csv_path, search.cv_results().unwrap()).unwrap();
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert!(csv.lines().next().unwrap().contains("param_n_neighbors"));
    assert_eq!(csv.lines().count(), 3);

    let html_path = dir.path().join("report.html");
    let report = render_search_report(&search, "KNN search").unwrap();
    report.save_to_file(&html_path).unwrap();
    let html = std::fs::read_to_string(&html_path).unwrap();
    assert!(html.contains("GridSearchCV evaluated 2 candidates"));
    assert!(html.contains("precision_macro"));
}
