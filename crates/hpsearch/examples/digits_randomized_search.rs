//! Randomized SVC search on the synthetic digits, listing the top 3 models.
use std::time::Instant;

use anyhow::Result;

use hpsearch::config::SearchConfig;
use hpsearch::cross_validation::CvStrategy;
use hpsearch::data_handling::train_test_split;
use hpsearch::distributions::{Distribution, ParamDistribution, ParamDistributions};
use hpsearch::io::{DatasetSource, SyntheticDigits};
use hpsearch::models::SvcClassifier;
use hpsearch::params::ParamValue;
use hpsearch::report::write_top_ranked;
use hpsearch::search::{HyperSearch, RandomizedSearchCV};

fn main() -> Result<()> {
    env_logger::init();

    let dataset = SyntheticDigits::default().load()?;
    let split = train_test_split(&dataset.flatten(), 0.5, 0)?;

    let mut dist = ParamDistributions::new();
    dist.insert("C".to_string(), Distribution::expon(100.0).into());
    dist.insert("gamma".to_string(), Distribution::expon(0.1).into());
    dist.insert("kernel".to_string(), ParamDistribution::choice(["rbf"]));
    dist.insert(
        "class_weight".to_string(),
        ParamDistribution::Choice(vec![ParamValue::from("balanced"), ParamValue::Null]),
    );

    let n_iter = 20;
    let mut search = RandomizedSearchCV::new(
        Box::new(SvcClassifier::default()),
        vec![dist],
        n_iter,
        SearchConfig::new(CvStrategy::folds(5), "accuracy").with_n_jobs(None),
    )?
    .with_random_state(0);

    let start = Instant::now();
    search.fit(&split.x_train, &split.y_train)?;
    println!(
        "RandomizedSearchCV took {:.2} seconds for {} candidates parameter settings.",
        start.elapsed().as_secs_f64(),
        n_iter
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Some(results) = search.cv_results() {
        write_top_ranked(&mut out, results, 3)?;
    }
    println!("Evaluation set accuracy: {:.3}", search.score(&split.x_test, &split.y_test)?);
    Ok(())
}
