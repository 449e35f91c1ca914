use ndarray::{Array1, Array2};

use crate::config::SearchConfig;
use crate::distributions::{ParamDistributions, ParameterSampler};
use crate::error::Result;
use crate::models::estimator::Estimator;
use crate::search::{HyperSearch, SearchCore};

/// Search over a fixed number of settings drawn from parameter distributions.
///
/// Each setting draws every parameter once: lists are sampled uniformly,
/// distributions yield one variate. Draws are independent, so the same
/// setting may be evaluated more than once.
pub struct RandomizedSearchCV {
    distributions: Vec<ParamDistributions>,
    n_iter: usize,
    random_state: Option<u64>,
    core: SearchCore,
}

impl RandomizedSearchCV {
    pub fn new(
        estimator: Box<dyn Estimator>,
        distributions: Vec<ParamDistributions>,
        n_iter: usize,
        config: SearchConfig,
    ) -> Result<Self> {
        // validates n_iter and every distribution
        ParameterSampler::new(distributions.clone(), n_iter, None)?;
        let core = SearchCore::new(estimator, config)?;
        Ok(RandomizedSearchCV {
            distributions,
            n_iter,
            random_state: None,
            core,
        })
    }

    /// Seed the sampler so repeated runs draw the same settings.
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    pub fn random_state(&self) -> Option<u64> {
        self.random_state
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<&Self> {
        let distributions = &self.distributions;
        let n_iter = self.n_iter;
        let random_state = self.random_state;
        self.core.run(
            || ParameterSampler::new(distributions.clone(), n_iter, random_state)?.sample(),
            x,
            y,
        )?;
        Ok(self)
    }
}

impl HyperSearch for RandomizedSearchCV {
    fn core(&self) -> &SearchCore {
        &self.core
    }

    fn search_name(&self) -> &'static str {
        "RandomizedSearchCV"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cross_validation::CvStrategy;
    use crate::distributions::{Distribution, ParamDistribution};
    use crate::models::knn::KNeighborsClassifier;
    use crate::search::SearchState;

    fn data() -> (Array2<f64>, Array1<usize>) {
        let x = Array2::from_shape_fn((20, 2), |(i, j)| {
            let class = (i % 2) as f64;
            class * 8.0 + (i as f64) * 0.05 + j as f64
        });
        let y = Array1::from_shape_fn(20, |i| i % 2);
        (x, y)
    }

    fn space() -> Vec<ParamDistributions> {
        let mut d = ParamDistributions::new();
        d.insert(
            "n_neighbors".to_string(),
            Distribution::Randint { low: 1, high: 6 }.into(),
        );
        d.insert(
            "weights".to_string(),
            ParamDistribution::choice(["uniform", "distance"]),
        );
        vec![d]
    }

    #[test]
    fn test_randomized_draws_exactly_n_iter() {
        let (x, y) = data();
        let mut search = RandomizedSearchCV::new(
            Box::new(KNeighborsClassifier::default()),
            space(),
            7,
            SearchConfig::new(CvStrategy::folds(2), "accuracy"),
        )
        .unwrap()
        .with_random_state(42);
        search.fit(&x, &y).unwrap();
        assert_eq!(search.state(), SearchState::Fit);
        assert_eq!(search.cv_results().unwrap().len(), 7);
    }

    #[test]
    fn test_same_seed_same_candidates() {
        let (x, y) = data();
        let run = || {
            let mut search = RandomizedSearchCV::new(
                Box::new(KNeighborsClassifier::default()),
                space(),
                5,
                SearchConfig::new(CvStrategy::folds(2), "accuracy"),
            )
            .unwrap()
            .with_random_state(3);
            search.fit(&x, &y).unwrap();
            search
                .cv_results()
                .unwrap()
                .iter()
                .map(|c| c.params.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_zero_iterations_rejected() {
        assert!(RandomizedSearchCV::new(
            Box::new(KNeighborsClassifier::default()),
            space(),
            0,
            SearchConfig::default(),
        )
        .is_err());
    }
}
