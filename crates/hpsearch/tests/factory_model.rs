use hpsearch::config::EstimatorKind;
use hpsearch::models::factory;
use ndarray::{Array1, Array2};

fn tiny() -> (Array2<f64>, Array1<usize>) {
    let x = Array2::from_shape_vec(
        (8, 2),
        vec![
            1.0, 0.0, // class 1
            0.0, 1.0, // class 0
            1.0, 0.1, // class 1
            0.0, 0.9, // class 0
            1.1, 0.0, // class 1
            0.0, 1.2, // class 0
            0.9, 0.1, // class 1
            0.1, 1.1, // class 0
        ],
    )
    .expect("failed to create feature matrix");
    let y = Array1::from_vec(vec![1, 0, 1, 0, 1, 0, 1, 0]);
    (x, y)
}

#[test]
fn test_factory_builds_and_predicts() {
    let (x, y) = tiny();
    for kind in [EstimatorKind::Svc, EstimatorKind::Gbdt, EstimatorKind::Knn] {
        let mut model = factory::build_estimator(kind);
        assert!(!model.is_fitted());
        model.fit(&x, &y).expect("fit failed");
        assert!(model.is_fitted());
        let predictions = model.predict(&x).expect("predict failed");
        assert_eq!(predictions.len(), x.nrows());
        assert!(predictions.iter().all(|&p| p == 0 || p == 1));
    }
}

#[test]
fn test_clone_unfitted_keeps_params_and_drops_state() {
    let (x, y) = tiny();
    let mut model = factory::build_estimator(EstimatorKind::Knn);
    model.fit(&x, &y).unwrap();
    let copy = model.clone_unfitted();
    assert!(!copy.is_fitted());
    assert_eq!(copy.get_params(), model.get_params());
}
