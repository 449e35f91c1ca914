//! Text reports for finished searches.
//!
//! `write_search_summary` prints the best setting, every candidate's score
//! and a classification report of the refit model on held-out data.
//! `html` and `plots` render the same results as a standalone page.
pub mod html;
pub mod plots;

use std::fmt;
use std::io::Write;

use anyhow::{Context, Result};
use ndarray::{Array1, Array2};

use crate::error::SearchError;
use crate::metrics::{precision_recall_fscore_support, Average};
use crate::params::format_params;
use crate::search::{CvResults, HyperSearch};

/// One row of a classification report.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassRow {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class precision, recall, F1 and support plus accuracy and the macro
/// and support-weighted averages.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub rows: Vec<ClassRow>,
    pub accuracy: f64,
    pub macro_avg: ClassRow,
    pub weighted_avg: ClassRow,
    pub digits: usize,
}

/// Build a classification report over the sorted union of labels.
pub fn classification_report(
    y_true: &Array1<usize>,
    y_pred: &Array1<usize>,
) -> Result<ClassificationReport, SearchError> {
    let prf = precision_recall_fscore_support(y_true, y_pred)?;
    let total = prf.total_support();

    let rows = prf
        .labels
        .iter()
        .enumerate()
        .map(|(i, label)| ClassRow {
            label: label.to_string(),
            precision: prf.precision[i],
            recall: prf.recall[i],
            f1: prf.f1[i],
            support: prf.support[i],
        })
        .collect();

    let avg_row = |name: &str, average: Average| -> Result<ClassRow, SearchError> {
        let (precision, recall, f1) = prf.average(average)?;
        Ok(ClassRow {
            label: name.to_string(),
            precision,
            recall,
            f1,
            support: total,
        })
    };

    Ok(ClassificationReport {
        rows,
        accuracy: prf.accuracy(),
        macro_avg: avg_row("macro avg", Average::Macro)?,
        weighted_avg: avg_row("weighted avg", Average::Weighted)?,
        digits: 2,
    })
}

impl ClassificationReport {
    /// Replace the numeric class ids with display names, in label order.
    pub fn with_target_names(mut self, names: &[&str]) -> Self {
        for (row, name) in self.rows.iter_mut().zip(names) {
            row.label = name.to_string();
        }
        self
    }

    pub fn total_support(&self) -> usize {
        self.macro_avg.support
    }

    fn width(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.label.len())
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(0)
            .max(self.digits)
    }

    fn write_row(&self, f: &mut fmt::Formatter, row: &ClassRow, width: usize) -> fmt::Result {
        let d = self.digits;
        writeln!(
            f,
            "{:>w$}  {:>9.d$} {:>9.d$} {:>9.d$} {:>9}",
            row.label,
            row.precision,
            row.recall,
            row.f1,
            row.support,
            w = width,
            d = d
        )
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let width = self.width();
        writeln!(
            f,
            "{:>w$}  {:>9} {:>9} {:>9} {:>9}",
            "",
            "precision",
            "recall",
            "f1-score",
            "support",
            w = width
        )?;
        writeln!(f)?;
        for row in &self.rows {
            self.write_row(f, row, width)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>w$}  {:>9} {:>9} {:>9.d$} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.total_support(),
            w = width,
            d = self.digits
        )?;
        self.write_row(f, &self.macro_avg, width)?;
        self.write_row(f, &self.weighted_avg, width)
    }
}

/// Write the walkthrough summary of a fitted search.
///
/// Prints the best parameter setting, `mean (+/-2*std) for params` for every
/// candidate in evaluation order, and the classification report of the refit
/// estimator on `(x_test, y_test)`.
pub fn write_search_summary<W, S>(
    out: &mut W,
    search: &S,
    x_test: &Array2<f64>,
    y_test: &Array1<usize>,
) -> Result<()>
where
    W: Write,
    S: HyperSearch + ?Sized,
{
    let results = search
        .cv_results()
        .ok_or_else(|| SearchError::NotFitted(search.search_name().to_string()))?;
    let best = search
        .best_params()
        .ok_or_else(|| SearchError::NotFitted(search.search_name().to_string()))?;

    writeln!(out, "# Tuning hyper-parameters for {}", results.scoring)?;
    writeln!(out)?;
    writeln!(out, "Best parameters set found on development set:")?;
    writeln!(out)?;
    writeln!(out, "{}", format_params(best))?;
    writeln!(out)?;
    writeln!(out, "Grid scores on development set:")?;
    writeln!(out)?;
    for record in results {
        writeln!(out, "{}", record.summary_line())?;
    }
    writeln!(out)?;

    let y_pred = search
        .predict(x_test)
        .context("Failed to predict the evaluation set with the refit estimator")?;
    let report = classification_report(y_test, &y_pred)?;
    writeln!(out, "Detailed classification report:")?;
    writeln!(out)?;
    writeln!(out, "The model is trained on the full development set.")?;
    writeln!(out, "The scores are computed on the full evaluation set.")?;
    writeln!(out)?;
    write!(out, "{}", report)?;
    writeln!(out)?;
    Ok(())
}

/// List the candidates ranked `1..=n_top`, ties included.
pub fn write_top_ranked<W: Write>(out: &mut W, results: &CvResults, n_top: usize) -> Result<()> {
    for rank in 1..=n_top {
        for idx in results.with_rank(rank) {
            let record = &results.candidates[idx];
            writeln!(out, "Model with rank: {}", rank)?;
            writeln!(
                out,
                "Mean validation score: {:.3} (std: {:.3})",
                record.mean_test_score, record.std_test_score
            )?;
            writeln!(out, "Parameters: {}", format_params(&record.params))?;
            writeln!(out)?;
        }
    }
    Ok(())
}
