use crate::config::EstimatorKind;
use crate::models::estimator::Estimator;

/// Build a boxed, unfitted estimator with default hyper-parameters.
/// Currently this is a thin factory implemented as a single function.
pub fn build_estimator(kind: EstimatorKind) -> Box<dyn Estimator> {
    match kind {
        EstimatorKind::Svc => Box::new(crate::models::svm::SvcClassifier::default()),
        EstimatorKind::Gbdt => Box::new(crate::models::gbdt::GbdtClassifier::default()),
        EstimatorKind::Knn => Box::new(crate::models::knn::KNeighborsClassifier::default()),
    }
}
