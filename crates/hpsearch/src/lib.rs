//! hpsearch: cross-validated hyper-parameter search for classifiers.
//!
//! The crate provides exhaustive (`GridSearchCV`) and randomized
//! (`RandomizedSearchCV`) searches over the hyper-parameters of any
//! `Estimator`, k-fold and stratified splitters, classification metrics,
//! dataset loaders for handwritten-digit images, and text/CSV/HTML reports
//! of the results.
//!
//! Candidate evaluations are independent and can run on a `rayon` pool; the
//! results do not depend on the number of workers.
pub mod config;
pub mod cross_validation;
pub mod data_handling;
pub mod distributions;
pub mod error;
pub mod io;
pub mod metrics;
pub mod models;
pub mod params;
pub mod report;
pub mod search;
pub mod stats;
