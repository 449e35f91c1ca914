use ndarray::{Array1, Array2};

use crate::error::{Result, SearchError};
use crate::params::{ParamSet, ParamValue};

/// The contract a classifier must satisfy to be searched over.
///
/// Implementations own their hyper-parameters and their fitted state. A
/// search never mutates the estimator it was given: every fit happens on a
/// `clone_unfitted` copy, which is why the trait requires `Send + Sync`.
pub trait Estimator: Send + Sync {
    /// Human readable name used in logs and error messages
    fn name(&self) -> &str;

    /// Fit on `x` (rows are samples) and class ids `y`.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()>;

    /// Predict one class id per row of `x`.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>>;

    /// Current hyper-parameters, including defaults.
    fn get_params(&self) -> ParamSet;

    /// Overwrite the named hyper-parameters. Unknown names and values of the
    /// wrong type are rejected; range checks happen in `fit`.
    fn set_params(&mut self, params: &ParamSet) -> Result<()>;

    /// A copy with the same hyper-parameters and no fitted state.
    fn clone_unfitted(&self) -> Box<dyn Estimator>;

    fn is_fitted(&self) -> bool;
}

impl Clone for Box<dyn Estimator> {
    fn clone(&self) -> Self {
        self.clone_unfitted()
    }
}

pub(crate) fn check_fit_input(x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(SearchError::InvalidInput(format!(
            "x has {} samples but y has {}",
            x.nrows(),
            y.len()
        )));
    }
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(SearchError::InvalidInput(format!(
            "x must be non-empty, got shape ({}, {})",
            x.nrows(),
            x.ncols()
        )));
    }
    Ok(())
}

/// Sorted distinct class ids.
pub(crate) fn classes_of(y: &Array1<usize>) -> Vec<usize> {
    let mut classes = y.to_vec();
    classes.sort_unstable();
    classes.dedup();
    classes
}

/// Index of the largest score; the first one wins on ties.
pub(crate) fn argmax(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, &s) in scores.iter().enumerate() {
        if s > scores[best] {
            best = i;
        }
    }
    best
}

// Typed accessors used by `set_params` implementations.

pub(crate) fn expect_f64(name: &str, value: &ParamValue) -> Result<f64> {
    value.as_f64().ok_or_else(|| SearchError::InvalidParameter {
        name: name.to_string(),
        reason: format!("expected a number, got {}", value),
    })
}

pub(crate) fn expect_usize(name: &str, value: &ParamValue) -> Result<usize> {
    match value.as_i64() {
        Some(v) if v >= 0 => Ok(v as usize),
        _ => Err(SearchError::InvalidParameter {
            name: name.to_string(),
            reason: format!("expected a non-negative integer, got {}", value),
        }),
    }
}

pub(crate) fn expect_str(name: &str, value: &ParamValue) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| SearchError::InvalidParameter {
            name: name.to_string(),
            reason: format!("expected a string, got {}", value),
        })
}

pub(crate) fn unknown(estimator: &str, name: &str) -> SearchError {
    SearchError::UnknownParameter {
        estimator: estimator.to_string(),
        name: name.to_string(),
    }
}
