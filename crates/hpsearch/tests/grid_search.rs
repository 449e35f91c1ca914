use hpsearch::config::{ErrorScore, SearchConfig};
use hpsearch::cross_validation::CvStrategy;
use hpsearch::data_handling::{train_test_split, TrainTestSplit};
use hpsearch::error::SearchError;
use hpsearch::io::{DatasetSource, SyntheticDigits};
use hpsearch::models::{Estimator, KNeighborsClassifier, SvcClassifier};
use hpsearch::params::{ParamGrid, ParamValue};
use hpsearch::search::{GridSearchCV, HyperSearch, SearchState};
use ndarray::Array1;

fn digits_split(n_per_class: usize) -> TrainTestSplit {
    let dataset = SyntheticDigits {
        n_per_class,
        ..SyntheticDigits::default()
    }
    .load()
    .unwrap();
    train_test_split(&dataset.flatten(), 0.5, 0).unwrap()
}

fn floats(values: &[f64]) -> Vec<ParamValue> {
    values.iter().map(|&v| ParamValue::Float(v)).collect()
}

/// The two grids of the digits walkthrough: 4 linear + 4x2 rbf settings.
fn walkthrough_grids() -> Vec<ParamGrid> {
    let mut linear = ParamGrid::new();
    linear.insert("kernel".to_string(), vec![ParamValue::from("linear")]);
    linear.insert("C".to_string(), floats(&[1.0, 10.0, 100.0, 1000.0]));

    let mut rbf = ParamGrid::new();
    rbf.insert("kernel".to_string(), vec![ParamValue::from("rbf")]);
    rbf.insert("gamma".to_string(), floats(&[1e-3, 1e-4]));
    rbf.insert("C".to_string(), floats(&[1.0, 10.0, 100.0, 1000.0]));

    vec![linear, rbf]
}

fn knn_grid() -> Vec<ParamGrid> {
    let mut grid = ParamGrid::new();
    grid.insert(
        "n_neighbors".to_string(),
        [1, 3, 5, 7].iter().map(|&k| ParamValue::Int(k)).collect(),
    );
    grid.insert(
        "weights".to_string(),
        vec![ParamValue::from("uniform"), ParamValue::from("distance")],
    );
    vec![grid]
}

#[test]
fn test_walkthrough_grid_evaluates_twelve_candidates() {
    let split = digits_split(12);
    let mut search = GridSearchCV::new(
        Box::new(SvcClassifier::default()),
        walkthrough_grids(),
        SearchConfig::new(CvStrategy::folds(5), "precision_macro"),
    )
    .unwrap();
    assert_eq!(search.n_candidates(), 12);

    search.fit(&split.x_train, &split.y_train).unwrap();
    let results = search.cv_results().unwrap();
    assert_eq!(results.len(), 12);
    for record in results {
        assert!((0.0..=1.0).contains(&record.mean_test_score));
        assert_eq!(record.split_test_scores.len(), 5);
    }

    // the linear grid comes first, C varying fastest inside each grid
    assert_eq!(results.candidates[0].params["kernel"], ParamValue::from("linear"));
    assert_eq!(results.candidates[4].params["kernel"], ParamValue::from("rbf"));

    let best = search.best_score().unwrap();
    assert!(results.iter().all(|c| best >= c.mean_test_score));
    let best_index = search.best_index().unwrap();
    assert_eq!(results.candidates[best_index].rank_test_score, 1);
}

#[test]
fn test_best_is_first_rank_one() {
    let split = digits_split(6);
    let mut search = GridSearchCV::new(
        Box::new(KNeighborsClassifier::default()),
        knn_grid(),
        SearchConfig::new(CvStrategy::folds(3), "accuracy"),
    )
    .unwrap();
    search.fit(&split.x_train, &split.y_train).unwrap();

    let results = search.cv_results().unwrap();
    let best_index = search.best_index().unwrap();
    assert_eq!(Some(best_index), results.with_rank(1).first().copied());
    assert_eq!(search.best_params(), Some(&results.candidates[best_index].params));
}

#[test]
fn test_results_are_deterministic_across_runs_and_workers() {
    let split = digits_split(6);
    let mean_scores = |n_jobs: Option<usize>| {
        let mut search = GridSearchCV::new(
            Box::new(KNeighborsClassifier::default()),
            knn_grid(),
            SearchConfig::new(CvStrategy::folds(3), "f1_macro").with_n_jobs(n_jobs),
        )
        .unwrap();
        search.fit(&split.x_train, &split.y_train).unwrap();
        search.cv_results().unwrap().mean_test_scores()
    };

    let sequential = mean_scores(Some(1));
    assert_eq!(sequential, mean_scores(Some(1)));
    assert_eq!(sequential, mean_scores(Some(3)));
    assert_eq!(sequential, mean_scores(None));
}

#[test]
fn test_refit_matches_manual_fit() {
    let split = digits_split(6);
    let mut search = GridSearchCV::new(
        Box::new(KNeighborsClassifier::default()),
        knn_grid(),
        SearchConfig::new(CvStrategy::folds(3), "accuracy"),
    )
    .unwrap();
    search.fit(&split.x_train, &split.y_train).unwrap();

    let mut manual = KNeighborsClassifier::default();
    manual.set_params(search.best_params().unwrap()).unwrap();
    manual.fit(&split.x_train, &split.y_train).unwrap();

    assert_eq!(
        search.predict(&split.x_test).unwrap(),
        manual.predict(&split.x_test).unwrap()
    );
    assert!(search.best_estimator().unwrap().is_fitted());
}

#[test]
fn test_no_refit_keeps_results_but_not_estimator() {
    let split = digits_split(6);
    let mut search = GridSearchCV::new(
        Box::new(KNeighborsClassifier::default()),
        knn_grid(),
        SearchConfig::new(CvStrategy::folds(3), "accuracy").with_refit(false),
    )
    .unwrap();
    search.fit(&split.x_train, &split.y_train).unwrap();
    assert!(search.best_params().is_some());
    assert!(search.best_estimator().is_none());
    assert_eq!(search.predict(&split.x_test), Err(SearchError::NotRefit));
}

#[test]
fn test_all_fits_failing_raises_even_with_error_score() {
    let split = digits_split(6);
    let mut grid = ParamGrid::new();
    grid.insert("n_neighbors".to_string(), vec![ParamValue::Int(1000)]);
    let mut search = GridSearchCV::new(
        Box::new(KNeighborsClassifier::default()),
        vec![grid],
        SearchConfig::new(CvStrategy::folds(3), "accuracy")
            .with_error_score(ErrorScore::Value(f64::NAN)),
    )
    .unwrap();
    let err = search.fit(&split.x_train, &split.y_train).err().unwrap();
    assert!(matches!(err, SearchError::AllFitsFailed { n_fits: 3, .. }));
    assert_eq!(search.state(), SearchState::Failed);
    // a failed search cannot be retried
    assert!(matches!(
        search.fit(&split.x_train, &split.y_train),
        Err(SearchError::InvalidState { .. })
    ));
}

#[test]
fn test_mismatched_inputs_fail_the_search() {
    let split = digits_split(6);
    let mut search = GridSearchCV::new(
        Box::new(KNeighborsClassifier::default()),
        knn_grid(),
        SearchConfig::default(),
    )
    .unwrap();
    let short_y = Array1::from_vec(split.y_train.to_vec()[1..].to_vec());
    let err = search.fit(&split.x_train, &short_y).err().unwrap();
    assert!(matches!(err, SearchError::InvalidInput(_)));
    assert_eq!(search.state(), SearchState::Failed);
}

#[test]
fn test_raise_aborts_the_search_on_worker_pools() {
    let split = digits_split(6);
    for n_jobs in [Some(3), None] {
        let mut grid = ParamGrid::new();
        grid.insert(
            "n_neighbors".to_string(),
            vec![ParamValue::Int(1), ParamValue::Int(1000)],
        );
        let mut search = GridSearchCV::new(
            Box::new(KNeighborsClassifier::default()),
            vec![grid],
            SearchConfig::new(CvStrategy::folds(3), "accuracy").with_n_jobs(n_jobs),
        )
        .unwrap();
        let err = search.fit(&split.x_train, &split.y_train).err().unwrap();
        // only the second candidate can fail; which of its folds is reported
        // depends on scheduling
        assert!(
            matches!(err, SearchError::FitFailed { candidate: 1, .. }),
            "n_jobs={:?}: {:?}",
            n_jobs,
            err
        );
        assert_eq!(search.state(), SearchState::Failed);
        assert!(search.cv_results().is_none());
    }
}

#[test]
fn test_zero_workers_rejected_at_construction() {
    let err = GridSearchCV::new(
        Box::new(KNeighborsClassifier::default()),
        knn_grid(),
        SearchConfig::default().with_n_jobs(Some(0)),
    )
    .err()
    .unwrap();
    assert!(matches!(err, SearchError::InvalidInput(_)));
}

#[test]
fn test_svc_refit_matches_manual_fit() {
    let split = digits_split(6);
    let mut grid = ParamGrid::new();
    grid.insert("kernel".to_string(), vec![ParamValue::from("linear")]);
    grid.insert("C".to_string(), floats(&[1.0, 10.0]));
    let mut search = GridSearchCV::new(
        Box::new(SvcClassifier::default()),
        vec![grid],
        SearchConfig::new(CvStrategy::folds(3), "accuracy").with_n_jobs(Some(2)),
    )
    .unwrap();
    search.fit(&split.x_train, &split.y_train).unwrap();

    let mut manual = SvcClassifier::default();
    manual.set_params(search.best_params().unwrap()).unwrap();
    manual.fit(&split.x_train, &split.y_train).unwrap();

    assert_eq!(
        search.predict(&split.x_test).unwrap(),
        manual.predict(&split.x_test).unwrap()
    );
    assert!(search.refit_time().unwrap() >= 0.0);
}
