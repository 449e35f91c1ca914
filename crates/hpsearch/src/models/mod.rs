pub mod estimator;
pub mod factory;
pub mod gbdt;
pub mod knn;
pub mod svm;

pub use estimator::Estimator;
pub use gbdt::{GbdtClassifier, GbdtParams};
pub use knn::{KNeighborsClassifier, KnnParams};
pub use svm::{Gamma, SvcClassifier, SvcParams};
