use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::cross_validation::CvStrategy;

/// What to do when fitting a candidate on a fold fails.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorScore {
    /// Abort the whole search with the fit error
    Raise,
    /// Record this score for the failed fold and continue
    Value(f64),
}

impl Default for ErrorScore {
    fn default() -> Self {
        ErrorScore::Raise
    }
}

/// Central configuration shared by grid and randomized searches.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub cv: CvStrategy,
    /// Scoring function identifier, e.g. `accuracy` or `f1_macro`
    pub scoring: String,
    /// Worker threads: `Some(1)` is sequential, `None` uses the global pool
    pub n_jobs: Option<usize>,
    pub refit: bool,
    pub error_score: ErrorScore,
    pub return_train_score: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cv: CvStrategy::default(),
            scoring: "accuracy".to_string(),
            n_jobs: Some(1),
            refit: true,
            error_score: ErrorScore::Raise,
            return_train_score: true,
        }
    }
}

impl SearchConfig {
    pub fn new(cv: CvStrategy, scoring: &str) -> Self {
        Self {
            cv,
            scoring: scoring.to_string(),
            ..Self::default()
        }
    }

    pub fn with_n_jobs(mut self, n_jobs: Option<usize>) -> Self {
        self.n_jobs = n_jobs;
        self
    }

    pub fn with_refit(mut self, refit: bool) -> Self {
        self.refit = refit;
        self
    }

    pub fn with_error_score(mut self, error_score: ErrorScore) -> Self {
        self.error_score = error_score;
        self
    }

    pub fn with_train_score(mut self, return_train_score: bool) -> Self {
        self.return_train_score = return_train_score;
        self
    }
}

/// Supported estimator types.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EstimatorKind {
    Svc,
    Gbdt,
    Knn,
}

impl Default for EstimatorKind {
    fn default() -> Self {
        EstimatorKind::Svc
    }
}

impl FromStr for EstimatorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "svc" | "svm" => Ok(EstimatorKind::Svc),
            "gbdt" => Ok(EstimatorKind::Gbdt),
            "knn" => Ok(EstimatorKind::Knn),
            _ => Err(format!(
                "Unknown estimator type: {}. Valid options are: svc, gbdt, knn",
                s
            )),
        }
    }
}
