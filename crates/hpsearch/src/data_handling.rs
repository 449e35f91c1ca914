//! Data structures for labeled image datasets and the train/test split.
//!
//! `ImageDataset` holds 2-D images, `Samples` the flattened feature matrix
//! the estimators consume, and `train_test_split` produces the disjoint,
//! exhaustive partitions used by the searches and the final report.
use ndarray::{Array1, Array2, Array3, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{Result, SearchError};

/// Labeled images with shape `(n_samples, height, width)`.
#[derive(Debug, Clone)]
pub struct ImageDataset {
    pub images: Array3<f64>,
    pub target: Array1<usize>,
}

impl ImageDataset {
    pub fn new(images: Array3<f64>, target: Array1<usize>) -> Result<Self> {
        if images.len_of(Axis(0)) != target.len() {
            return Err(SearchError::InvalidInput(format!(
                "{} images but {} labels",
                images.len_of(Axis(0)),
                target.len()
            )));
        }
        Ok(Self { images, target })
    }

    pub fn n_samples(&self) -> usize {
        self.target.len()
    }

    /// (height, width)
    pub fn image_shape(&self) -> (usize, usize) {
        let (_, h, w) = self.images.dim();
        (h, w)
    }

    /// Flatten each image, row-major, into one feature vector.
    pub fn flatten(&self) -> Samples {
        let (n, h, w) = self.images.dim();
        let x = Array2::from_shape_fn((n, h * w), |(i, j)| self.images[[i, j / w, j % w]]);
        Samples {
            x,
            y: self.target.clone(),
        }
    }

    pub fn log_summary(&self) {
        let (h, w) = self.image_shape();
        let mut classes = self.target.to_vec();
        classes.sort_unstable();
        classes.dedup();
        log::info!(
            "Loaded {} images of {}x{} pixels across {} classes",
            self.n_samples(),
            h,
            w,
            classes.len()
        );
    }
}

/// Feature matrix (rows are samples) with one class id per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Samples {
    pub x: Array2<f64>,
    pub y: Array1<usize>,
}

impl Samples {
    pub fn new(x: Array2<f64>, y: Array1<usize>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(SearchError::InvalidInput(format!(
                "x has {} samples but y has {}",
                x.nrows(),
                y.len()
            )));
        }
        Ok(Self { x, y })
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    /// Rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Samples {
        Samples {
            x: self.x.select(Axis(0), indices),
            y: self.y.select(Axis(0), indices),
        }
    }
}

/// Disjoint train/test partitions of a `Samples`.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<usize>,
    pub y_test: Array1<usize>,
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Split samples into random train and test subsets.
///
/// The samples are permuted with a generator seeded from `seed`; the first
/// `ceil(test_size * n)` permuted indices form the test set and the rest the
/// training set, so the same seed always yields the same split.
///
/// # Arguments
///
/// * `samples` - The full sample set.
/// * `test_size` - Fraction of samples in the test set, strictly between 0 and 1.
/// * `seed` - Seed of the permutation.
pub fn train_test_split(samples: &Samples, test_size: f64, seed: u64) -> Result<TrainTestSplit> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(SearchError::InvalidInput(format!(
            "test_size must be strictly between 0 and 1, got {}",
            test_size
        )));
    }
    let n = samples.len();
    let n_test = (test_size * n as f64).ceil() as usize;
    let n_train = n.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(SearchError::InvalidInput(format!(
            "With n_samples={} and test_size={}, one of the partitions would be empty",
            n, test_size
        )));
    }

    let mut permutation: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    permutation.shuffle(&mut rng);

    let test_indices = permutation[..n_test].to_vec();
    let train_indices = permutation[n_test..].to_vec();

    log::debug!(
        "Split {} samples into {} training and {} test samples (seed {})",
        n,
        n_train,
        n_test,
        seed
    );

    Ok(TrainTestSplit {
        x_train: samples.x.select(Axis(0), &train_indices),
        x_test: samples.x.select(Axis(0), &test_indices),
        y_train: samples.y.select(Axis(0), &train_indices),
        y_test: samples.y.select(Axis(0), &test_indices),
        train_indices,
        test_indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(n: usize) -> Samples {
        let x = Array2::from_shape_fn((n, 3), |(i, j)| (i * 3 + j) as f64);
        let y = Array1::from_shape_fn(n, |i| i % 2);
        Samples::new(x, y).unwrap()
    }

    #[test]
    fn test_split_is_disjoint_and_exhaustive() {
        let s = samples(11);
        let split = train_test_split(&s, 0.5, 0).unwrap();
        assert_eq!(split.test_indices.len(), 6);
        assert_eq!(split.train_indices.len(), 5);
        let mut all: Vec<usize> = split
            .train_indices
            .iter()
            .chain(split.test_indices.iter())
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..11).collect::<Vec<_>>());
        // rows travel with their labels
        for (row, &idx) in split.test_indices.iter().enumerate() {
            assert_eq!(split.x_test[(row, 0)], (idx * 3) as f64);
            assert_eq!(split.y_test[row], idx % 2);
        }
    }

    #[test]
    fn test_split_is_deterministic_per_seed() {
        let s = samples(30);
        let a = train_test_split(&s, 0.5, 7).unwrap();
        let b = train_test_split(&s, 0.5, 7).unwrap();
        let c = train_test_split(&s, 0.5, 8).unwrap();
        assert_eq!(a.test_indices, b.test_indices);
        assert_ne!(a.test_indices, c.test_indices);
    }

    #[test]
    fn test_split_rejects_bad_sizes() {
        let s = samples(4);
        assert!(train_test_split(&s, 0.0, 0).is_err());
        assert!(train_test_split(&s, 1.0, 0).is_err());
        assert!(train_test_split(&samples(1), 0.5, 0).is_err());
    }

    #[test]
    fn test_flatten_is_row_major() {
        let images = Array3::from_shape_fn((2, 2, 3), |(n, r, c)| (n * 100 + r * 10 + c) as f64);
        let ds = ImageDataset::new(images, Array1::from_vec(vec![0, 1])).unwrap();
        let flat = ds.flatten();
        assert_eq!(flat.x.dim(), (2, 6));
        assert_eq!(flat.x.row(1).to_vec(), vec![100.0, 101.0, 102.0, 110.0, 111.0, 112.0]);
    }
}
