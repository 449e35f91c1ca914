use std::error::Error;
use std::fmt;

/// Errors raised while configuring or running a hyper-parameter search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchError {
    /// Feature/label arrays that cannot be used together
    InvalidInput(String),
    /// Empty grids, empty candidate lists, bad distribution parameters
    InvalidParamSpace(String),
    UnknownParameter { estimator: String, name: String },
    InvalidParameter { name: String, reason: String },
    InvalidScoring(String),
    InvalidCv(String),
    /// Failure reported by an estimator while fitting or predicting
    Estimator(String),
    NotFitted(String),
    FitFailed {
        candidate: usize,
        fold: usize,
        params: String,
        reason: String,
    },
    AllFitsFailed { n_fits: usize, reason: String },
    InvalidState { found: String },
    NotRefit,
    ThreadPool(String),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SearchError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            SearchError::InvalidParamSpace(msg) => {
                write!(f, "Invalid parameter space: {}", msg)
            }
            SearchError::UnknownParameter { estimator, name } => write!(
                f,
                "Invalid parameter '{}' for estimator {}",
                name, estimator
            ),
            SearchError::InvalidParameter { name, reason } => {
                write!(f, "Invalid value for parameter '{}': {}", name, reason)
            }
            SearchError::InvalidScoring(name) => write!(
                f,
                "Unknown scoring function: {}. Valid options are: {}",
                name,
                crate::metrics::SCORER_NAMES.join(", ")
            ),
            SearchError::InvalidCv(msg) => write!(f, "Invalid cross-validation setup: {}", msg),
            SearchError::Estimator(msg) => write!(f, "Estimator error: {}", msg),
            SearchError::NotFitted(name) => write!(
                f,
                "This {} instance is not fitted yet. Call 'fit' before using it",
                name
            ),
            SearchError::FitFailed {
                candidate,
                fold,
                params,
                reason,
            } => write!(
                f,
                "Fit failed for candidate {} on fold {} with parameters {}: {}",
                candidate, fold, params, reason
            ),
            SearchError::AllFitsFailed { n_fits, reason } => write!(
                f,
                "All the {} fits failed. Last error: {}",
                n_fits, reason
            ),
            SearchError::InvalidState { found } => write!(
                f,
                "Search is {} and cannot be fitted again; construct a new search",
                found
            ),
            SearchError::NotRefit => write!(
                f,
                "The search was run with refit=false; best_estimator is not available"
            ),
            SearchError::ThreadPool(msg) => write!(f, "Failed to build worker pool: {}", msg),
        }
    }
}

impl Error for SearchError {}

pub type Result<T> = std::result::Result<T, SearchError>;
