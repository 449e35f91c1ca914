//! Exhaustive SVC search on the synthetic digits, once per scoring function.
//!
//! Run with `RUST_LOG=info cargo run --example digits_grid_search -- [report.html]`.
use anyhow::Result;

use hpsearch::config::SearchConfig;
use hpsearch::cross_validation::CvStrategy;
use hpsearch::data_handling::train_test_split;
use hpsearch::io::{DatasetSource, SyntheticDigits};
use hpsearch::models::SvcClassifier;
use hpsearch::params::{ParamGrid, ParamValue};
use hpsearch::report::html::render_search_report;
use hpsearch::report::write_search_summary;
use hpsearch::search::GridSearchCV;

fn param_grids() -> Vec<ParamGrid> {
    let c_values: Vec<ParamValue> = [1, 10, 100, 1000].iter().map(|&c| ParamValue::Int(c)).collect();

    let mut linear = ParamGrid::new();
    linear.insert("kernel".to_string(), vec![ParamValue::from("linear")]);
    linear.insert("C".to_string(), c_values.clone());

    let mut rbf = ParamGrid::new();
    rbf.insert("kernel".to_string(), vec![ParamValue::from("rbf")]);
    rbf.insert("gamma".to_string(), vec![ParamValue::Float(1e-3), ParamValue::Float(1e-4)]);
    rbf.insert("C".to_string(), c_values);

    vec![linear, rbf]
}

fn main() -> Result<()> {
    env_logger::init();
    let report_path = std::env::args().nth(1);

    let dataset = SyntheticDigits::default().load()?;
    dataset.log_summary();
    let split = train_test_split(&dataset.flatten(), 0.5, 0)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for scoring in ["precision_macro", "recall_macro"] {
        let mut search = GridSearchCV::new(
            Box::new(SvcClassifier::default()),
            param_grids(),
            SearchConfig::new(CvStrategy::folds(5), scoring).with_n_jobs(None),
        )?;
        search.fit(&split.x_train, &split.y_train)?;
        write_search_summary(&mut out, &search, &split.x_test, &split.y_test)?;

        if let Some(path) = &report_path {
            let path = path.replace(".html", &format!("_{}.html", scoring));
            render_search_report(&search, &format!("Digits SVC ({})", scoring))?.save_to_file(&path)?;
            log::info!("Report written to {}", path);
        }
    }
    Ok(())
}
