use std::cmp::Ordering;

use ndarray::{Array1, Array2, ArrayView1};

use crate::error::{Result, SearchError};
use crate::models::estimator::{
    check_fit_input, classes_of, expect_f64, expect_str, expect_usize, unknown, Estimator,
};
use crate::params::{ParamSet, ParamValue};

const NAME: &str = "KNeighborsClassifier";

/// Hyper-parameters of the nearest-neighbours classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct KnnParams {
    pub n_neighbors: usize,
    /// `uniform` or `distance`
    pub weights: String,
    /// Minkowski power, 1 = Manhattan, 2 = Euclidean
    pub p: f64,
}

impl Default for KnnParams {
    fn default() -> Self {
        Self {
            n_neighbors: 5,
            weights: "uniform".to_string(),
            p: 2.0,
        }
    }
}

/// Brute-force k-nearest-neighbours vote. Fully deterministic: equal
/// distances keep training order, equal votes go to the smaller class id.
pub struct KNeighborsClassifier {
    params: KnnParams,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<usize>>,
    classes: Vec<usize>,
}

impl KNeighborsClassifier {
    pub fn new(params: KnnParams) -> Self {
        Self {
            params,
            x_train: None,
            y_train: None,
            classes: Vec::new(),
        }
    }

    pub fn with_k(k: usize) -> Self {
        Self::new(KnnParams {
            n_neighbors: k,
            ..KnnParams::default()
        })
    }

    fn distance(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        let p = self.params.p;
        if p == 2.0 {
            a.iter()
                .zip(b.iter())
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f64>()
                .sqrt()
        } else if p == 1.0 {
            a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
        } else {
            a.iter()
                .zip(b.iter())
                .map(|(x, y)| (x - y).abs().powf(p))
                .sum::<f64>()
                .powf(1.0 / p)
        }
    }
}

impl Default for KNeighborsClassifier {
    fn default() -> Self {
        Self::new(KnnParams::default())
    }
}

impl Estimator for KNeighborsClassifier {
    fn name(&self) -> &str {
        NAME
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        check_fit_input(x, y)?;
        if self.params.n_neighbors == 0 {
            return Err(SearchError::Estimator(
                "n_neighbors must be at least 1".to_string(),
            ));
        }
        if self.params.n_neighbors > x.nrows() {
            return Err(SearchError::Estimator(format!(
                "Expected n_neighbors <= n_samples, but n_samples = {}, n_neighbors = {}",
                x.nrows(),
                self.params.n_neighbors
            )));
        }
        if !(self.params.p >= 1.0) {
            return Err(SearchError::Estimator(format!(
                "p must be at least 1, got {}",
                self.params.p
            )));
        }
        match self.params.weights.as_str() {
            "uniform" | "distance" => {}
            other => {
                return Err(SearchError::Estimator(format!(
                    "weights must be 'uniform' or 'distance', got '{}'",
                    other
                )))
            }
        }

        self.classes = classes_of(y);
        self.x_train = Some(x.to_owned());
        self.y_train = Some(y.to_owned());
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let (x_train, y_train) = match (&self.x_train, &self.y_train) {
            (Some(x), Some(y)) => (x, y),
            _ => return Err(SearchError::NotFitted(NAME.to_string())),
        };
        if x.ncols() != x_train.ncols() {
            return Err(SearchError::InvalidInput(format!(
                "X has {} features, but {} was fitted with {}",
                x.ncols(),
                NAME,
                x_train.ncols()
            )));
        }

        let k = self.params.n_neighbors;
        let by_distance = self.params.weights == "distance";

        let mut predictions = Vec::with_capacity(x.nrows());
        for row in x.rows() {
            let mut neighbors: Vec<(f64, usize)> = x_train
                .rows()
                .into_iter()
                .enumerate()
                .map(|(i, train_row)| (self.distance(row, train_row), i))
                .collect();
            // stable sort keeps training order among equal distances
            neighbors.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
            neighbors.truncate(k);

            let mut votes = vec![0.0f64; self.classes.len()];
            let exact: Vec<usize> = neighbors
                .iter()
                .filter(|(d, _)| *d == 0.0)
                .map(|&(_, i)| i)
                .collect();
            for &(d, i) in &neighbors {
                let w = if !by_distance {
                    1.0
                } else if !exact.is_empty() {
                    // exact matches take the whole vote
                    if d == 0.0 {
                        1.0
                    } else {
                        0.0
                    }
                } else {
                    1.0 / d
                };
                if let Ok(c) = self.classes.binary_search(&y_train[i]) {
                    votes[c] += w;
                }
            }

            let mut best = 0;
            for (c, &v) in votes.iter().enumerate() {
                if v > votes[best] {
                    best = c;
                }
            }
            predictions.push(self.classes[best]);
        }

        Ok(Array1::from_vec(predictions))
    }

    fn get_params(&self) -> ParamSet {
        let mut params = ParamSet::new();
        params.insert(
            "n_neighbors".to_string(),
            ParamValue::Int(self.params.n_neighbors as i64),
        );
        params.insert("p".to_string(), ParamValue::Float(self.params.p));
        params.insert("weights".to_string(), ParamValue::Str(self.params.weights.clone()));
        params
    }

    fn set_params(&mut self, params: &ParamSet) -> Result<()> {
        let mut next = self.params.clone();
        for (name, value) in params {
            match name.as_str() {
                "n_neighbors" => next.n_neighbors = expect_usize(name, value)?,
                "weights" => next.weights = expect_str(name, value)?,
                "p" => next.p = expect_f64(name, value)?,
                _ => return Err(unknown(NAME, name)),
            }
        }
        self.params = next;
        self.x_train = None;
        self.y_train = None;
        Ok(())
    }

    fn clone_unfitted(&self) -> Box<dyn Estimator> {
        Box::new(KNeighborsClassifier::new(self.params.clone()))
    }

    fn is_fitted(&self) -> bool {
        self.x_train.is_some()
    }
}
