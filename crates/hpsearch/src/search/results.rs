//! Per-candidate cross-validation records.
use std::collections::BTreeSet;

use serde::Serialize;

use crate::params::{format_params, ParamSet};
use crate::search::evaluate::FoldScores;
use crate::stats::{mean, rank_min_desc, std_dev};

/// Aggregated scores of one parameter setting across all folds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateRecord {
    pub params: ParamSet,
    pub split_test_scores: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_train_scores: Option<Vec<f64>>,
    pub mean_test_score: f64,
    pub std_test_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_train_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std_train_score: Option<f64>,
    pub mean_fit_time: f64,
    pub std_fit_time: f64,
    pub mean_score_time: f64,
    pub std_score_time: f64,
    pub rank_test_score: usize,
}

impl CandidateRecord {
    fn from_folds(params: ParamSet, folds: &[FoldScores]) -> Self {
        let test: Vec<f64> = folds.iter().map(|f| f.test_score).collect();
        let train: Option<Vec<f64>> = folds.iter().map(|f| f.train_score).collect();
        let fit: Vec<f64> = folds.iter().map(|f| f.fit_time).collect();
        let score: Vec<f64> = folds.iter().map(|f| f.score_time).collect();

        CandidateRecord {
            params,
            mean_test_score: mean(&test),
            std_test_score: std_dev(&test),
            mean_train_score: train.as_deref().map(mean),
            std_train_score: train.as_deref().map(std_dev),
            mean_fit_time: mean(&fit),
            std_fit_time: std_dev(&fit),
            mean_score_time: mean(&score),
            std_score_time: std_dev(&score),
            split_test_scores: test,
            split_train_scores: train,
            rank_test_score: 0,
        }
    }

    /// `0.987 (+/-0.021) for {'C': 10, 'kernel': 'rbf'}`
    pub fn summary_line(&self) -> String {
        format!(
            "{:.3} (+/-{:.3}) for {}",
            self.mean_test_score,
            self.std_test_score * 2.0,
            format_params(&self.params)
        )
    }
}

/// Results of a finished search, one record per candidate in evaluation
/// order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CvResults {
    pub scoring: String,
    pub n_splits: usize,
    pub candidates: Vec<CandidateRecord>,
}

impl CvResults {
    /// Build records from unit scores laid out candidate-major: the scores of
    /// candidate `c` on fold `f` live at `c * n_splits + f`.
    pub(crate) fn from_units(
        scoring: &str,
        params: Vec<ParamSet>,
        units: &[FoldScores],
        n_splits: usize,
    ) -> Self {
        let mut candidates: Vec<CandidateRecord> = params
            .into_iter()
            .zip(units.chunks(n_splits))
            .map(|(p, folds)| CandidateRecord::from_folds(p, folds))
            .collect();

        let means: Vec<f64> = candidates.iter().map(|c| c.mean_test_score).collect();
        for (record, rank) in candidates.iter_mut().zip(rank_min_desc(&means)) {
            record.rank_test_score = rank;
        }

        CvResults {
            scoring: scoring.to_string(),
            n_splits,
            candidates,
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CandidateRecord> {
        self.candidates.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CandidateRecord> {
        self.candidates.iter()
    }

    /// Index of the first candidate ranked 1.
    pub fn best_index(&self) -> Option<usize> {
        self.candidates.iter().position(|c| c.rank_test_score == 1)
    }

    pub fn mean_test_scores(&self) -> Vec<f64> {
        self.candidates.iter().map(|c| c.mean_test_score).collect()
    }

    /// Every parameter name used by any candidate, sorted.
    pub fn param_names(&self) -> Vec<String> {
        let names: BTreeSet<&String> = self.candidates.iter().flat_map(|c| c.params.keys()).collect();
        names.into_iter().cloned().collect()
    }

    /// Candidate indices with rank `rank`, in evaluation order.
    pub fn with_rank(&self, rank: usize) -> Vec<usize> {
        self.candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| c.rank_test_score == rank)
            .map(|(i, _)| i)
            .collect()
    }
}

impl<'a> IntoIterator for &'a CvResults {
    type Item = &'a CandidateRecord;
    type IntoIter = std::slice::Iter<'a, CandidateRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}
