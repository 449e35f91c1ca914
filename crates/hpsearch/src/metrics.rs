//! Classification metrics and named scorers.
//!
//! Every metric here follows the "higher is better" convention. Divisions by
//! zero (a class never predicted, or never present) count as 0.
use std::collections::HashMap;
use std::str::FromStr;

use linfa::dataset::{AsTargets, Labels};
use linfa::metrics::{ConfusionMatrix, ToConfusionMatrix};
use ndarray::{Array1, Array2, ArrayView1, Ix1};
use statrs::statistics::Statistics;

use crate::error::{Result, SearchError};
use crate::models::estimator::Estimator;

/// Identifiers accepted by `Scorer::from_str`.
pub const SCORER_NAMES: &[&str] = &[
    "accuracy",
    "balanced_accuracy",
    "precision",
    "precision_macro",
    "precision_micro",
    "precision_weighted",
    "recall",
    "recall_macro",
    "recall_micro",
    "recall_weighted",
    "f1",
    "f1_macro",
    "f1_micro",
    "f1_weighted",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Average {
    /// Positive class `1` only; labels must be binary
    Binary,
    Macro,
    Micro,
    Weighted,
}

/// Per-label precision, recall, F1 and support.
#[derive(Debug, Clone, PartialEq)]
pub struct PrfSupport {
    pub labels: Vec<usize>,
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
    pub f1: Vec<f64>,
    pub support: Vec<usize>,
    accuracy: f64,
}

impl PrfSupport {
    pub fn total_support(&self) -> usize {
        self.support.iter().sum()
    }

    /// Fraction of samples whose prediction matches the truth.
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    /// Average of (precision, recall, f1).
    pub fn average(&self, average: Average) -> Result<(f64, f64, f64)> {
        match average {
            Average::Macro => Ok((
                mean_or_zero(&self.precision),
                mean_or_zero(&self.recall),
                mean_or_zero(&self.f1),
            )),
            Average::Weighted => {
                let total = self.total_support() as f64;
                if total == 0.0 {
                    return Ok((0.0, 0.0, 0.0));
                }
                let w = |v: &[f64]| {
                    v.iter()
                        .zip(self.support.iter())
                        .map(|(x, &s)| x * s as f64)
                        .sum::<f64>()
                        / total
                };
                Ok((w(&self.precision), w(&self.recall), w(&self.f1)))
            }
            // every sample carries exactly one true and one predicted label,
            // so pooled precision and recall both reduce to accuracy
            Average::Micro => Ok((self.accuracy, self.accuracy, self.accuracy)),
            Average::Binary => {
                if self.labels.iter().any(|&l| l > 1) {
                    return Err(SearchError::InvalidInput(format!(
                        "Target is multiclass ({} labels) but average='binary'. \
                         Choose a _macro, _micro or _weighted scorer",
                        self.labels.len()
                    )));
                }
                match self.labels.iter().position(|&l| l == 1) {
                    Some(i) => Ok((self.precision[i], self.recall[i], self.f1[i])),
                    None => Ok((0.0, 0.0, 0.0)),
                }
            }
        }
    }
}

fn mean_or_zero(v: &[f64]) -> f64 {
    if v.is_empty() {
        0.0
    } else {
        v.mean()
    }
}

/// linfa reports 0/0 as NaN; such scores count as 0.
fn zero_if_nan(v: f32) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v as f64
    }
}

fn check_lengths(y_true: &Array1<usize>, y_pred: &Array1<usize>) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(SearchError::InvalidInput(format!(
            "y_true has {} samples but y_pred has {}",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(SearchError::InvalidInput(
            "cannot score an empty prediction".to_string(),
        ));
    }
    Ok(())
}

/// Sorted union of the labels found in both arrays.
pub fn unique_labels(y_true: &Array1<usize>, y_pred: &Array1<usize>) -> Vec<usize> {
    let mut labels: Vec<usize> = y_true.iter().chain(y_pred.iter()).copied().collect();
    labels.sort_unstable();
    labels.dedup();
    labels
}

/// Ground truth handed to linfa with a fixed label order.
///
/// linfa indexes the confusion matrix by the labels of the calling side,
/// collected through a `HashSet`. Overriding `labels` pins that order to the
/// sorted union of both arrays, so no sample is dropped and the one-vs-all
/// split lines up with `labels`.
struct SortedTargets<'a> {
    targets: ArrayView1<'a, usize>,
    labels: &'a [usize],
}

impl AsTargets for SortedTargets<'_> {
    type Elem = usize;
    type Ix = Ix1;

    fn as_targets(&self) -> ArrayView1<usize> {
        self.targets.view()
    }
}

impl Labels for SortedTargets<'_> {
    type Elem = usize;

    fn label_count(&self) -> Vec<HashMap<usize, usize>> {
        self.targets.label_count()
    }

    fn labels(&self) -> Vec<usize> {
        self.labels.to_vec()
    }
}

/// linfa confusion matrix over the sorted union of labels.
///
/// Rows follow the true label and columns the predicted one, so each entry
/// of `split_one_vs_all()` describes `labels[i]` with the usual precision and
/// recall.
pub fn confusion_matrix(
    y_true: &Array1<usize>,
    y_pred: &Array1<usize>,
) -> Result<(Vec<usize>, ConfusionMatrix<usize>)> {
    check_lengths(y_true, y_pred)?;
    let labels = unique_labels(y_true, y_pred);
    let y_true = y_true.as_standard_layout();
    let y_pred = y_pred.as_standard_layout();
    let truth = SortedTargets {
        targets: y_true.view(),
        labels: &labels,
    };
    let cm = truth
        .confusion_matrix(&y_pred.view())
        .map_err(|e| SearchError::InvalidInput(e.to_string()))?;
    Ok((labels, cm))
}

/// Per-label precision, recall, F1 and support over the sorted union of
/// labels.
pub fn precision_recall_fscore_support(
    y_true: &Array1<usize>,
    y_pred: &Array1<usize>,
) -> Result<PrfSupport> {
    let (labels, cm) = confusion_matrix(y_true, y_pred)?;
    let counts = y_true.label_count().pop().unwrap_or_default();

    let per_label = cm.split_one_vs_all();
    let precision = per_label.iter().map(|c| zero_if_nan(c.precision())).collect();
    let recall = per_label.iter().map(|c| zero_if_nan(c.recall())).collect();
    let f1 = per_label.iter().map(|c| zero_if_nan(c.f1_score())).collect();
    let support = labels
        .iter()
        .map(|l| counts.get(l).copied().unwrap_or(0))
        .collect();

    Ok(PrfSupport {
        labels,
        precision,
        recall,
        f1,
        support,
        accuracy: zero_if_nan(cm.accuracy()),
    })
}

pub fn accuracy_score(y_true: &Array1<usize>, y_pred: &Array1<usize>) -> Result<f64> {
    let (_, cm) = confusion_matrix(y_true, y_pred)?;
    Ok(zero_if_nan(cm.accuracy()))
}

/// Mean per-class recall over the classes present in `y_true`.
pub fn balanced_accuracy_score(y_true: &Array1<usize>, y_pred: &Array1<usize>) -> Result<f64> {
    let prf = precision_recall_fscore_support(y_true, y_pred)?;
    let recalls: Vec<f64> = prf
        .recall
        .iter()
        .zip(prf.support.iter())
        .filter(|(_, &s)| s > 0)
        .map(|(&r, _)| r)
        .collect();
    Ok(mean_or_zero(&recalls))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Metric {
    Precision,
    Recall,
    F1,
}

/// A scoring function selected by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scorer {
    Accuracy,
    BalancedAccuracy,
    Precision(Average),
    Recall(Average),
    F1(Average),
}

impl Default for Scorer {
    fn default() -> Self {
        Scorer::Accuracy
    }
}

impl FromStr for Scorer {
    type Err = SearchError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        match name.as_str() {
            "accuracy" => return Ok(Scorer::Accuracy),
            "balanced_accuracy" => return Ok(Scorer::BalancedAccuracy),
            _ => {}
        }

        let (metric, suffix) = match name.split_once('_') {
            Some((m, a)) => (m, Some(a)),
            None => (name.as_str(), None),
        };
        let average = match suffix {
            None => Average::Binary,
            Some("macro") => Average::Macro,
            Some("micro") => Average::Micro,
            Some("weighted") => Average::Weighted,
            Some(_) => return Err(SearchError::InvalidScoring(s.to_string())),
        };
        match metric {
            "precision" => Ok(Scorer::Precision(average)),
            "recall" => Ok(Scorer::Recall(average)),
            "f1" => Ok(Scorer::F1(average)),
            _ => Err(SearchError::InvalidScoring(s.to_string())),
        }
    }
}

impl Scorer {
    /// Score predictions against ground truth.
    pub fn score_predictions(&self, y_true: &Array1<usize>, y_pred: &Array1<usize>) -> Result<f64> {
        let (metric, average) = match *self {
            Scorer::Accuracy => return accuracy_score(y_true, y_pred),
            Scorer::BalancedAccuracy => return balanced_accuracy_score(y_true, y_pred),
            Scorer::Precision(a) => (Metric::Precision, a),
            Scorer::Recall(a) => (Metric::Recall, a),
            Scorer::F1(a) => (Metric::F1, a),
        };
        let prf = precision_recall_fscore_support(y_true, y_pred)?;
        let (p, r, f) = prf.average(average)?;
        Ok(match metric {
            Metric::Precision => p,
            Metric::Recall => r,
            Metric::F1 => f,
        })
    }

    /// Predict with a fitted estimator and score the predictions.
    pub fn score(&self, estimator: &dyn Estimator, x: &Array2<f64>, y_true: &Array1<usize>) -> Result<f64> {
        let y_pred = estimator.predict(x)?;
        self.score_predictions(y_true, &y_pred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrays() -> (Array1<usize>, Array1<usize>) {
        (
            Array1::from_vec(vec![0, 0, 1, 1, 2, 2]),
            Array1::from_vec(vec![0, 1, 1, 1, 2, 0]),
        )
    }

    #[test]
    fn test_precision_recall_per_label() {
        let (t, p) = arrays();
        let prf = precision_recall_fscore_support(&t, &p).unwrap();
        assert_eq!(prf.labels, vec![0, 1, 2]);
        // label 1 is over-predicted and label 2 under-predicted, so precision
        // and recall differ in opposite directions
        assert!((prf.precision[0] - 0.5).abs() < 1e-6);
        assert!((prf.precision[1] - 2.0 / 3.0).abs() < 1e-6);
        assert!((prf.precision[2] - 1.0).abs() < 1e-6);
        assert!((prf.recall[1] - 1.0).abs() < 1e-6);
        assert!((prf.recall[2] - 0.5).abs() < 1e-6);
        assert!((prf.f1[1] - 0.8).abs() < 1e-6);
        assert_eq!(prf.support, vec![2, 2, 2]);
    }

    #[test]
    fn test_micro_average_equals_accuracy() {
        let (t, p) = arrays();
        let prf = precision_recall_fscore_support(&t, &p).unwrap();
        let (mp, mr, mf) = prf.average(Average::Micro).unwrap();
        let acc = accuracy_score(&t, &p).unwrap();
        assert!((acc - 4.0 / 6.0).abs() < 1e-6);
        assert_eq!((mp, mr, mf), (acc, acc, acc));
    }

    #[test]
    fn test_zero_division_counts_as_zero() {
        let t = Array1::from_vec(vec![0, 0, 1]);
        let p = Array1::from_vec(vec![0, 0, 0]);
        let prf = precision_recall_fscore_support(&t, &p).unwrap();
        assert_eq!(prf.precision[1], 0.0);
        assert_eq!(prf.recall[1], 0.0);
        assert_eq!(prf.f1[1], 0.0);
    }

    #[test]
    fn test_label_only_in_predictions_is_kept() {
        let t = Array1::from_vec(vec![0, 0, 1, 1]);
        let p = Array1::from_vec(vec![0, 3, 1, 1]);
        let prf = precision_recall_fscore_support(&t, &p).unwrap();
        assert_eq!(prf.labels, vec![0, 1, 3]);
        assert_eq!(prf.support, vec![2, 2, 0]);
        // the sample predicted as 3 still counts against label 0
        assert_eq!(prf.recall[0], 0.5);
        assert_eq!(prf.precision[2], 0.0);
        assert_eq!(accuracy_score(&t, &p).unwrap(), 0.75);
        assert_eq!(balanced_accuracy_score(&t, &p).unwrap(), 0.75);
    }

    #[test]
    fn test_macro_and_weighted_average() {
        let t = Array1::from_vec(vec![0, 0, 0, 1]);
        let p = Array1::from_vec(vec![0, 0, 1, 1]);
        let prf = precision_recall_fscore_support(&t, &p).unwrap();
        let (mp, mr, _) = prf.average(Average::Macro).unwrap();
        assert!((mp - 0.75).abs() < 1e-6);
        assert!((mr - (2.0 / 3.0 + 1.0) / 2.0).abs() < 1e-6);
        let (wp, _, _) = prf.average(Average::Weighted).unwrap();
        assert!((wp - (3.0 * 1.0 + 0.5) / 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_scorer_names() {
        assert_eq!("f1_macro".parse::<Scorer>().unwrap(), Scorer::F1(Average::Macro));
        assert_eq!("precision_weighted".parse::<Scorer>().unwrap(), Scorer::Precision(Average::Weighted));
        assert_eq!("recall".parse::<Scorer>().unwrap(), Scorer::Recall(Average::Binary));
        assert!("roc_auc".parse::<Scorer>().is_err());
        assert!("f1_samples".parse::<Scorer>().is_err());
        for name in SCORER_NAMES {
            assert!(name.parse::<Scorer>().is_ok(), "{} should parse", name);
        }
    }

    #[test]
    fn test_binary_average_rejects_multiclass() {
        let (t, p) = arrays();
        assert!(Scorer::Precision(Average::Binary).score_predictions(&t, &p).is_err());
    }

    #[test]
    fn test_binary_scorer_uses_label_one() {
        let t = Array1::from_vec(vec![0, 0, 1, 1]);
        let p = Array1::from_vec(vec![0, 1, 1, 1]);
        let precision = Scorer::Precision(Average::Binary).score_predictions(&t, &p).unwrap();
        let recall = Scorer::Recall(Average::Binary).score_predictions(&t, &p).unwrap();
        assert!((precision - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(recall, 1.0);
    }

    #[test]
    fn test_confusion_matrix_follows_sorted_labels() {
        let (t, p) = arrays();
        let (labels, cm) = confusion_matrix(&t, &p).unwrap();
        assert_eq!(labels, vec![0, 1, 2]);
        let split = cm.split_one_vs_all();
        assert_eq!(split.len(), 3);
        assert_eq!(split[2].precision(), 1.0);
        assert_eq!(split[2].recall(), 0.5);
        assert!((cm.accuracy() - 4.0 / 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_mismatched_lengths_error() {
        let t = Array1::from_vec(vec![0, 1]);
        let p = Array1::from_vec(vec![0]);
        assert!(matches!(accuracy_score(&t, &p), Err(SearchError::InvalidInput(_))));
    }
}
