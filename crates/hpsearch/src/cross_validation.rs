//! K-fold splitters used to cross-validate each candidate.
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// Cross-validation strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CvStrategy {
    /// Contiguous folds over the sample order (optionally shuffled first)
    KFold {
        n_splits: usize,
        #[serde(default)]
        shuffle: bool,
        #[serde(default)]
        seed: Option<u64>,
    },
    /// Folds that preserve the class proportions of `y`
    StratifiedKFold {
        n_splits: usize,
        #[serde(default)]
        shuffle: bool,
        #[serde(default)]
        seed: Option<u64>,
    },
}

impl Default for CvStrategy {
    fn default() -> Self {
        CvStrategy::folds(5)
    }
}

/// A single train/validation split. Both index lists are sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl CvStrategy {
    /// Stratified, unshuffled k-fold: the default for classifiers.
    pub fn folds(n_splits: usize) -> Self {
        CvStrategy::StratifiedKFold {
            n_splits,
            shuffle: false,
            seed: None,
        }
    }

    pub fn n_splits(&self) -> usize {
        match self {
            CvStrategy::KFold { n_splits, .. } | CvStrategy::StratifiedKFold { n_splits, .. } => {
                *n_splits
            }
        }
    }

    /// Generate train/validation splits for the labels `y`.
    pub fn split(&self, y: &Array1<usize>) -> Result<Vec<Fold>> {
        let n_samples = y.len();
        let n_splits = self.n_splits();
        if n_splits < 2 {
            return Err(SearchError::InvalidCv(format!(
                "n_splits must be at least 2, got {}",
                n_splits
            )));
        }
        if n_samples < n_splits {
            return Err(SearchError::InvalidCv(format!(
                "Cannot have number of splits n_splits={} greater than the number of samples: n_samples={}",
                n_splits, n_samples
            )));
        }

        let test_folds = match self {
            CvStrategy::KFold { shuffle, seed, .. } => {
                k_fold_assignment(n_samples, n_splits, *shuffle, *seed)
            }
            CvStrategy::StratifiedKFold { shuffle, seed, .. } => {
                stratified_assignment(y, n_splits, *shuffle, *seed)?
            }
        };

        let folds = (0..n_splits)
            .map(|fold| {
                let (test, train): (Vec<usize>, Vec<usize>) =
                    (0..n_samples).partition(|&i| test_folds[i] == fold);
                log::trace!(
                    "Prepared fold {} with {} training and {} validation samples",
                    fold,
                    train.len(),
                    test.len()
                );
                Fold { train, test }
            })
            .collect();
        Ok(folds)
    }
}

fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Fold id per sample; the first `n % k` folds get one extra sample.
fn k_fold_assignment(n_samples: usize, n_splits: usize, shuffle: bool, seed: Option<u64>) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n_samples).collect();
    if shuffle {
        indices.shuffle(&mut rng_for(seed));
    }

    let base = n_samples / n_splits;
    let remainder = n_samples % n_splits;
    let mut test_folds = vec![0usize; n_samples];
    let mut start = 0;
    for fold in 0..n_splits {
        let size = if fold < remainder { base + 1 } else { base };
        for &idx in &indices[start..start + size] {
            test_folds[idx] = fold;
        }
        start += size;
    }
    test_folds
}

/// Fold id per sample so that each fold receives a near-equal share of
/// every class.
///
/// The per-fold share of class `k` is the number of `k`s found when taking
/// every `n_splits`-th element of the sorted label vector, starting at the
/// fold's offset. Samples of class `k` are then assigned, in their original
/// order, to folds in contiguous blocks of those sizes.
fn stratified_assignment(
    y: &Array1<usize>,
    n_splits: usize,
    shuffle: bool,
    seed: Option<u64>,
) -> Result<Vec<usize>> {
    let mut classes = y.to_vec();
    classes.sort_unstable();
    classes.dedup();

    let counts: Vec<usize> = classes
        .iter()
        .map(|c| y.iter().filter(|&&l| l == *c).count())
        .collect();
    let max_count = counts.iter().copied().max().unwrap_or(0);
    let min_count = counts.iter().copied().min().unwrap_or(0);

    if n_splits > max_count {
        return Err(SearchError::InvalidCv(format!(
            "n_splits={} cannot be greater than the number of members in each class",
            n_splits
        )));
    }
    if n_splits > min_count {
        log::warn!(
            "The least populated class in y has only {} members, which is less than n_splits={}",
            min_count,
            n_splits
        );
    }

    let mut sorted = y.to_vec();
    sorted.sort_unstable();

    // allocation[fold][class]
    let mut allocation = vec![vec![0usize; classes.len()]; n_splits];
    for (pos, label) in sorted.iter().enumerate() {
        // labels come from `classes`, so the search always succeeds
        if let Ok(k) = classes.binary_search(label) {
            allocation[pos % n_splits][k] += 1;
        }
    }

    let mut rng = if shuffle { Some(rng_for(seed)) } else { None };
    let mut test_folds = vec![0usize; y.len()];
    for (k, class) in classes.iter().enumerate() {
        let mut folds_for_class: Vec<usize> = (0..n_splits)
            .flat_map(|fold| std::iter::repeat(fold).take(allocation[fold][k]))
            .collect();
        if let Some(rng) = rng.as_mut() {
            folds_for_class.shuffle(rng);
        }
        let members = y
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l == *class)
            .map(|(i, _)| i);
        for (idx, fold) in members.zip(folds_for_class) {
            test_folds[idx] = fold;
        }
    }
    Ok(test_folds)
}
