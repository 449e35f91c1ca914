//! Drivers for the `grid` and `random` subcommands.
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use hpsearch::config::SearchConfig;
use hpsearch::data_handling::{train_test_split, TrainTestSplit};
use hpsearch::io::write_cv_results_csv;
use hpsearch::models::factory::build_estimator;
use hpsearch::report::html::render_search_report;
use hpsearch::report::{write_search_summary, write_top_ranked};
use hpsearch::search::{CvResults, GridSearchCV, HyperSearch, RandomizedSearchCV};

use crate::config::TuneConfig;
use crate::util::tagged_path;

/// Load the configured dataset, flatten it and split off the evaluation set.
pub fn prepare_data(config: &TuneConfig) -> Result<TrainTestSplit> {
    let source = config.data.source();
    log::info!("Loading {}", source.describe());
    let dataset = source.load().context("Failed to load dataset")?;
    dataset.log_summary();

    let split = train_test_split(&dataset.flatten(), config.test_size, config.seed)?;
    log::info!(
        "Development set: {} samples, evaluation set: {} samples",
        split.x_train.nrows(),
        split.x_test.nrows()
    );
    Ok(split)
}

fn export<S: HyperSearch>(config: &TuneConfig, search: &S, tag: Option<&str>) -> Result<()> {
    let results = match search.cv_results() {
        Some(r) => r,
        None => return Ok(()),
    };
    let target = |path: &Path| match tag {
        Some(tag) => tagged_path(path, tag),
        None => path.to_path_buf(),
    };

    if let Some(output) = &config.output {
        write_cv_results_csv(target(output.as_path()), results)?;
    }
    if let Some(report_path) = &config.report {
        let title = format!("{} ({})", search.search_name(), results.scoring);
        let path = target(report_path.as_path());
        render_search_report(search, &title)?.save_to_file(&path)?;
        log::info!("Report written to {}", path.display());
    }
    Ok(())
}

/// Run one grid search per configured scoring function and write the
/// walkthrough summary of each to `out`.
pub fn run_grid<W: Write>(config: &TuneConfig, out: &mut W) -> Result<Vec<CvResults>> {
    let split = prepare_data(config)?;

    let scores = if config.grid.scores.is_empty() {
        vec![config.search.scoring.clone()]
    } else {
        config.grid.scores.clone()
    };

    let mut all_results = Vec::with_capacity(scores.len());
    for scoring in &scores {
        log::info!("Tuning hyper-parameters for {}", scoring);
        let search_config = SearchConfig {
            scoring: scoring.clone(),
            ..config.search.clone()
        };
        let mut search = GridSearchCV::new(
            build_estimator(config.estimator),
            config.grid.param_grid.clone(),
            search_config,
        )?;
        search.fit(&split.x_train, &split.y_train)?;

        write_search_summary(out, &search, &split.x_test, &split.y_test)?;
        let tag = if scores.len() > 1 { Some(scoring.as_str()) } else { None };
        export(config, &search, tag)?;

        if let Some(results) = search.cv_results() {
            all_results.push(results.clone());
        }
    }
    Ok(all_results)
}

/// Run a randomized search and list its best-ranked candidates.
pub fn run_random<W: Write>(config: &TuneConfig, out: &mut W) -> Result<CvResults> {
    let split = prepare_data(config)?;

    let mut search = RandomizedSearchCV::new(
        build_estimator(config.estimator),
        config.random.param_distributions.clone(),
        config.random.n_iter,
        config.search.clone(),
    )?;
    if let Some(seed) = config.random.random_state {
        search = search.with_random_state(seed);
    }

    let start = Instant::now();
    search.fit(&split.x_train, &split.y_train)?;
    writeln!(
        out,
        "RandomizedSearchCV took {:.2} seconds for {} candidates parameter settings.",
        start.elapsed().as_secs_f64(),
        config.random.n_iter
    )?;

    let results = search
        .cv_results()
        .context("Randomized search finished without results")?;
    write_top_ranked(out, results, config.random.n_top)?;

    if config.search.refit {
        let score = search.score(&split.x_test, &split.y_test)?;
        writeln!(out, "Evaluation set {}: {:.3}", config.search.scoring, score)?;
    }

    export(config, &search, None)?;
    Ok(results.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hpsearch::config::EstimatorKind;
    use hpsearch::cross_validation::CvStrategy;
    use hpsearch::distributions::{Distribution, ParamDistributions};
    use hpsearch::params::{ParamGrid, ParamValue};

    fn small_knn_config() -> TuneConfig {
        let mut config = TuneConfig::default();
        config.estimator = EstimatorKind::Knn;
        config.data.n_per_class = 6;
        config.search.cv = CvStrategy::folds(3);

        let mut grid = ParamGrid::new();
        grid.insert(
            "n_neighbors".to_string(),
            vec![ParamValue::Int(1), ParamValue::Int(3)],
        );
        config.grid.param_grid = vec![grid];

        let mut dist = ParamDistributions::new();
        dist.insert(
            "n_neighbors".to_string(),
            Distribution::Randint { low: 1, high: 5 }.into(),
        );
        config.random.param_distributions = vec![dist];
        config.random.n_iter = 3;
        config.random.random_state = Some(1);
        config
    }

    #[test]
    fn test_run_grid_one_search_per_score() {
        let mut out = Vec::new();
        let results = run_grid(&small_knn_config(), &mut out).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].scoring, "precision_macro");
        assert_eq!(results[1].scoring, "recall_macro");
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("# Tuning hyper-parameters for recall_macro"));
    }

    #[test]
    fn test_run_random_writes_exports() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = small_knn_config();
        config.output = Some(dir.path().join("cv_results.csv"));
        config.report = Some(dir.path().join("report.html"));

        let mut out = Vec::new();
        let results = run_random(&config, &mut out).unwrap();
        assert_eq!(results.len(), 3);
        assert!(dir.path().join("cv_results.csv").exists());
        assert!(dir.path().join("report.html").exists());
        assert!(String::from_utf8(out).unwrap().contains("Model with rank: 1"));
    }
}
