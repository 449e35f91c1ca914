use std::time::Instant;

use ndarray::{Array1, Array2, Axis};

use crate::cross_validation::Fold;
use crate::error::Result;
use crate::metrics::Scorer;
use crate::models::estimator::Estimator;
use crate::params::ParamSet;

/// Scores and timings of one candidate on one fold.
#[derive(Debug, Clone, PartialEq)]
pub struct FoldScores {
    pub test_score: f64,
    pub train_score: Option<f64>,
    /// Seconds spent in `fit`
    pub fit_time: f64,
    /// Seconds spent predicting and scoring
    pub score_time: f64,
}

/// Result of a single candidate x fold unit.
#[derive(Debug, Clone, PartialEq)]
pub enum FoldOutcome {
    Scored(FoldScores),
    /// The estimator failed to fit or to predict on this fold
    Failed { reason: String, fit_time: f64 },
}

/// Fit an unfitted clone of `base` with `params` on the fold's training rows
/// and score it on the validation rows.
///
/// Only a rejected `set_params` is returned as an error. Failures inside
/// `fit` or `predict` are reported as `FoldOutcome::Failed` so the caller can
/// apply its error policy.
pub fn fit_and_score(
    base: &dyn Estimator,
    params: &ParamSet,
    x: &Array2<f64>,
    y: &Array1<usize>,
    fold: &Fold,
    scorer: &Scorer,
    return_train_score: bool,
) -> Result<FoldOutcome> {
    let mut estimator = base.clone_unfitted();
    estimator.set_params(params)?;

    let x_train = x.select(Axis(0), &fold.train);
    let y_train = y.select(Axis(0), &fold.train);
    let x_test = x.select(Axis(0), &fold.test);
    let y_test = y.select(Axis(0), &fold.test);

    let start = Instant::now();
    let fitted = estimator.fit(&x_train, &y_train);
    let fit_time = start.elapsed().as_secs_f64();
    if let Err(e) = fitted {
        return Ok(FoldOutcome::Failed {
            reason: e.to_string(),
            fit_time,
        });
    }

    let start = Instant::now();
    let test_score = match scorer.score(estimator.as_ref(), &x_test, &y_test) {
        Ok(s) => s,
        Err(e) => {
            return Ok(FoldOutcome::Failed {
                reason: e.to_string(),
                fit_time,
            })
        }
    };
    let score_time = start.elapsed().as_secs_f64();

    let train_score = if return_train_score {
        match scorer.score(estimator.as_ref(), &x_train, &y_train) {
            Ok(s) => Some(s),
            Err(e) => {
                return Ok(FoldOutcome::Failed {
                    reason: e.to_string(),
                    fit_time,
                })
            }
        }
    } else {
        None
    };

    Ok(FoldOutcome::Scored(FoldScores {
        test_score,
        train_score,
        fit_time,
        score_time,
    }))
}
