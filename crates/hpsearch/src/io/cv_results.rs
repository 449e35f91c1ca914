//! CSV export of search results.
use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::search::CvResults;

/// Header row: one `param_<name>` column per parameter, then the aggregate
/// and per-split columns.
fn header(results: &CvResults, names: &[String]) -> Vec<String> {
    let train = results
        .candidates
        .first()
        .map_or(false, |c| c.split_train_scores.is_some());

    let mut cols: Vec<String> = vec![
        "mean_fit_time".into(),
        "std_fit_time".into(),
        "mean_score_time".into(),
        "std_score_time".into(),
    ];
    cols.extend(names.iter().map(|n| format!("param_{}", n)));
    cols.push("params".into());
    cols.extend((0..results.n_splits).map(|i| format!("split{}_test_score", i)));
    for col in ["mean_test_score", "std_test_score", "rank_test_score"] {
        cols.push(col.to_string());
    }
    if train {
        cols.extend((0..results.n_splits).map(|i| format!("split{}_train_score", i)));
        cols.push("mean_train_score".to_string());
        cols.push("std_train_score".to_string());
    }
    cols
}

/// Write one row per candidate to `writer`.
pub fn write_cv_results<W: Write>(writer: W, results: &CvResults) -> Result<()> {
    let names = results.param_names();
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(header(results, &names))
        .context("Failed to write CSV header")?;

    for (idx, record) in results.iter().enumerate() {
        let mut row: Vec<String> = vec![
            record.mean_fit_time.to_string(),
            record.std_fit_time.to_string(),
            record.mean_score_time.to_string(),
            record.std_score_time.to_string(),
        ];
        // parameters missing from this candidate's grid stay empty
        row.extend(names.iter().map(|n| {
            record
                .params
                .get(n)
                .map(|v| v.to_string().trim_matches('\'').to_string())
                .unwrap_or_default()
        }));
        row.push(serde_json::to_string(&record.params).context("Failed to serialize params")?);
        row.extend(record.split_test_scores.iter().map(|s| s.to_string()));
        row.push(record.mean_test_score.to_string());
        row.push(record.std_test_score.to_string());
        row.push(record.rank_test_score.to_string());
        if let Some(train) = &record.split_train_scores {
            row.extend(train.iter().map(|s| s.to_string()));
            row.push(record.mean_train_score.unwrap_or(f64::NAN).to_string());
            row.push(record.std_train_score.unwrap_or(f64::NAN).to_string());
        }
        csv_writer
            .write_record(&row)
            .with_context(|| format!("Failed to write candidate {}", idx))?;
    }

    csv_writer.flush().context("Failed to flush CSV writer")?;
    Ok(())
}

/// Write the results table to a CSV file at `path`.
pub fn write_cv_results_csv<P: AsRef<Path>>(path: P, results: &CvResults) -> Result<()> {
    let file = File::create(path.as_ref())
        .with_context(|| format!("Failed to create file: {}", path.as_ref().display()))?;
    write_cv_results(file, results)?;
    log::info!("Wrote {} candidates to {}", results.len(), path.as_ref().display());
    Ok(())
}
