//! Cross-validated hyper-parameter searches.
//!
//! `GridSearchCV` and `RandomizedSearchCV` differ only in how they produce
//! candidate parameter settings. Both hand their candidates to
//! `SearchCore`, which splits the training data into folds, evaluates every
//! candidate on every fold, aggregates the scores, selects the best
//! candidate and refits it.
pub mod evaluate;
pub mod grid;
pub mod randomized;
pub mod results;

use std::fmt;
use std::time::Instant;

use ndarray::{Array1, Array2};
use rayon::prelude::*;

use crate::config::{ErrorScore, SearchConfig};
use crate::error::{Result, SearchError};
use crate::metrics::Scorer;
use crate::models::estimator::Estimator;
use crate::params::{format_params, ParamSet};
use crate::search::evaluate::{fit_and_score, FoldOutcome, FoldScores};

pub use grid::GridSearchCV;
pub use randomized::RandomizedSearchCV;
pub use results::{CandidateRecord, CvResults};

/// Lifecycle of a search object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Unfit,
    Fitting,
    Fit,
    Failed,
}

impl fmt::Display for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            SearchState::Unfit => "unfit",
            SearchState::Fitting => "fitting",
            SearchState::Fit => "fit",
            SearchState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Evaluation engine shared by the grid and randomized searches.
pub struct SearchCore {
    estimator: Box<dyn Estimator>,
    config: SearchConfig,
    scorer: Scorer,
    state: SearchState,
    results: Option<CvResults>,
    best_index: Option<usize>,
    best_estimator: Option<Box<dyn Estimator>>,
    refit_time: Option<f64>,
}

impl SearchCore {
    pub fn new(estimator: Box<dyn Estimator>, config: SearchConfig) -> Result<Self> {
        let scorer: Scorer = config.scoring.parse()?;
        if config.n_jobs == Some(0) {
            return Err(SearchError::InvalidInput(
                "n_jobs must be at least 1 or unset".to_string(),
            ));
        }
        if config.cv.n_splits() < 2 {
            return Err(SearchError::InvalidCv(format!(
                "n_splits must be at least 2, got {}",
                config.cv.n_splits()
            )));
        }
        Ok(SearchCore {
            estimator,
            config,
            scorer,
            state: SearchState::Unfit,
            results: None,
            best_index: None,
            best_estimator: None,
            refit_time: None,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn scorer(&self) -> Scorer {
        self.scorer
    }

    pub fn estimator(&self) -> &dyn Estimator {
        self.estimator.as_ref()
    }

    /// Produce candidates with `candidates` and run the full search on them.
    ///
    /// Only an `Unfit` search can be run. Any error moves the search to
    /// `Failed`, success moves it to `Fit`.
    pub fn run<F>(&mut self, candidates: F, x: &Array2<f64>, y: &Array1<usize>) -> Result<()>
    where
        F: FnOnce() -> Result<Vec<ParamSet>>,
    {
        if self.state != SearchState::Unfit {
            return Err(SearchError::InvalidState {
                found: self.state.to_string(),
            });
        }
        self.state = SearchState::Fitting;

        match self.evaluate(candidates, x, y) {
            Ok(()) => {
                self.state = SearchState::Fit;
                Ok(())
            }
            Err(e) => {
                log::error!("Search failed: {}", e);
                self.state = SearchState::Failed;
                Err(e)
            }
        }
    }

    fn evaluate<F>(&mut self, candidates: F, x: &Array2<f64>, y: &Array1<usize>) -> Result<()>
    where
        F: FnOnce() -> Result<Vec<ParamSet>>,
    {
        if x.nrows() != y.len() {
            return Err(SearchError::InvalidInput(format!(
                "x has {} samples but y has {}",
                x.nrows(),
                y.len()
            )));
        }
        if x.nrows() == 0 {
            return Err(SearchError::InvalidInput("no training samples".to_string()));
        }

        let candidates = candidates()?;
        if candidates.is_empty() {
            return Err(SearchError::InvalidParamSpace(
                "no candidate parameter settings".to_string(),
            ));
        }

        // reject unknown names and mistyped values before any fit
        for params in &candidates {
            self.estimator.clone_unfitted().set_params(params)?;
        }

        let folds = self.config.cv.split(y)?;
        let n_splits = folds.len();
        let n_fits = candidates.len() * n_splits;
        log::info!(
            "Fitting {} folds for each of {} candidates, totalling {} fits",
            n_splits,
            candidates.len(),
            n_fits
        );

        let units: Vec<(usize, usize)> = (0..candidates.len())
            .flat_map(|c| (0..n_splits).map(move |f| (c, f)))
            .collect();

        let base = self.estimator.as_ref();
        let scorer = &self.scorer;
        let return_train = self.config.return_train_score;
        let error_score = self.config.error_score;
        let candidates_ref = &candidates;
        let folds_ref = &folds;

        let run_unit = |&(c, f): &(usize, usize)| -> Result<UnitResult> {
            let params = &candidates_ref[c];
            let outcome = fit_and_score(base, params, x, y, &folds_ref[f], scorer, return_train)?;
            match outcome {
                FoldOutcome::Scored(scores) => {
                    log::debug!(
                        "[CV {}/{}] END {} score={:.3}",
                        f + 1,
                        n_splits,
                        format_params(params),
                        scores.test_score
                    );
                    Ok(UnitResult {
                        scores,
                        failure: None,
                    })
                }
                FoldOutcome::Failed { reason, fit_time } => match error_score {
                    ErrorScore::Raise => Err(SearchError::FitFailed {
                        candidate: c,
                        fold: f,
                        params: format_params(params),
                        reason,
                    }),
                    ErrorScore::Value(v) => {
                        log::warn!(
                            "Fit failed for {} on fold {}, recording score {}: {}",
                            format_params(params),
                            f,
                            v,
                            reason
                        );
                        Ok(UnitResult {
                            scores: FoldScores {
                                test_score: v,
                                train_score: if return_train { Some(v) } else { None },
                                fit_time,
                                score_time: 0.0,
                            },
                            failure: Some(reason),
                        })
                    }
                },
            }
        };

        let unit_results: Vec<UnitResult> = match self.config.n_jobs {
            Some(1) => units.iter().map(run_unit).collect::<Result<Vec<_>>>()?,
            Some(n) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| SearchError::ThreadPool(e.to_string()))?;
                pool.install(|| units.par_iter().map(run_unit).collect::<Result<Vec<_>>>())?
            }
            None => units.par_iter().map(run_unit).collect::<Result<Vec<_>>>()?,
        };

        let failures: Vec<&String> = unit_results.iter().filter_map(|u| u.failure.as_ref()).collect();
        if failures.len() == n_fits {
            return Err(SearchError::AllFitsFailed {
                n_fits,
                reason: failures.last().map(|s| s.to_string()).unwrap_or_default(),
            });
        }
        if !failures.is_empty() {
            log::warn!(
                "{} fits failed out of a total of {}; their scores were set to the error score",
                failures.len(),
                n_fits
            );
        }

        let scores: Vec<FoldScores> = unit_results.into_iter().map(|u| u.scores).collect();
        let results = CvResults::from_units(&self.config.scoring, candidates, &scores, n_splits);
        let best_index = results
            .best_index()
            .ok_or_else(|| SearchError::InvalidInput("no candidate was ranked".to_string()))?;
        let best = &results.candidates[best_index];
        log::info!(
            "Best {} of {:.3} for {}",
            self.config.scoring,
            best.mean_test_score,
            format_params(&best.params)
        );

        if self.config.refit {
            let start = Instant::now();
            let mut estimator = self.estimator.clone_unfitted();
            estimator.set_params(&best.params)?;
            estimator.fit(x, y)?;
            let elapsed = start.elapsed().as_secs_f64();
            log::info!("Refit {} on {} samples in {:.3}s", estimator.name(), x.nrows(), elapsed);
            self.best_estimator = Some(estimator);
            self.refit_time = Some(elapsed);
        }

        self.best_index = Some(best_index);
        self.results = Some(results);
        Ok(())
    }
}

struct UnitResult {
    scores: FoldScores,
    failure: Option<String>,
}

/// Read access shared by every search.
///
/// All accessors return `None` (or `NotFitted`) until the search reaches
/// `SearchState::Fit`.
pub trait HyperSearch {
    fn core(&self) -> &SearchCore;

    fn state(&self) -> SearchState {
        self.core().state
    }

    fn config(&self) -> &SearchConfig {
        self.core().config()
    }

    fn cv_results(&self) -> Option<&CvResults> {
        match self.core().state {
            SearchState::Fit => self.core().results.as_ref(),
            _ => None,
        }
    }

    fn best_index(&self) -> Option<usize> {
        self.cv_results().and(self.core().best_index)
    }

    fn best_params(&self) -> Option<&ParamSet> {
        let idx = self.best_index()?;
        self.cv_results().map(|r| &r.candidates[idx].params)
    }

    fn best_score(&self) -> Option<f64> {
        let idx = self.best_index()?;
        self.cv_results().map(|r| r.candidates[idx].mean_test_score)
    }

    /// The estimator refit on the whole training set with the best parameters.
    fn best_estimator(&self) -> Option<&dyn Estimator> {
        self.cv_results()?;
        self.core().best_estimator.as_deref()
    }

    /// Seconds spent refitting the best estimator.
    fn refit_time(&self) -> Option<f64> {
        self.cv_results()?;
        self.core().refit_time
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        self.fitted_estimator()?.predict(x)
    }

    /// Score the refit estimator on `x` with the search's scoring function.
    fn score(&self, x: &Array2<f64>, y: &Array1<usize>) -> Result<f64> {
        let estimator = self.fitted_estimator()?;
        self.core().scorer().score(estimator, x, y)
    }

    #[doc(hidden)]
    fn fitted_estimator(&self) -> Result<&dyn Estimator> {
        if self.state() != SearchState::Fit {
            return Err(SearchError::NotFitted(self.search_name().to_string()));
        }
        self.core().best_estimator.as_deref().ok_or(SearchError::NotRefit)
    }

    fn search_name(&self) -> &'static str;
}
