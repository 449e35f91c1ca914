use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};

use hpsearch::config::{EstimatorKind, SearchConfig};
use hpsearch::distributions::{Distribution, ParamDistribution, ParamDistributions};
use hpsearch::io::{DatasetSource, OptDigitsCsv, SyntheticDigits};
use hpsearch::params::{ParamGrid, ParamValue};

use crate::util::validate_csv_file;

/// Where the images come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// optdigits-style CSV; the synthetic digits are used when unset
    pub path: Option<PathBuf>,
    pub height: usize,
    pub width: usize,
    pub n_per_class: usize,
    pub noise: f64,
    pub seed: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        let synthetic = SyntheticDigits::default();
        Self {
            path: None,
            height: 8,
            width: 8,
            n_per_class: synthetic.n_per_class,
            noise: synthetic.noise,
            seed: synthetic.seed,
        }
    }
}

impl DataConfig {
    pub fn source(&self) -> Box<dyn DatasetSource> {
        match &self.path {
            Some(path) => Box::new(OptDigitsCsv {
                path: path.clone(),
                height: self.height,
                width: self.width,
            }),
            None => Box::new(SyntheticDigits {
                n_per_class: self.n_per_class,
                noise: self.noise,
                seed: self.seed,
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub param_grid: Vec<ParamGrid>,
    /// One search per scoring function, in order
    pub scores: Vec<String>,
}

impl Default for GridConfig {
    fn default() -> Self {
        let c_values: Vec<ParamValue> = [1, 10, 100, 1000].iter().map(|&c| ParamValue::Int(c)).collect();

        let mut linear = ParamGrid::new();
        linear.insert("kernel".to_string(), vec![ParamValue::from("linear")]);
        linear.insert("C".to_string(), c_values.clone());

        let mut rbf = ParamGrid::new();
        rbf.insert("kernel".to_string(), vec![ParamValue::from("rbf")]);
        rbf.insert(
            "gamma".to_string(),
            vec![ParamValue::Float(1e-3), ParamValue::Float(1e-4)],
        );
        rbf.insert("C".to_string(), c_values);

        Self {
            param_grid: vec![linear, rbf],
            scores: vec!["precision_macro".to_string(), "recall_macro".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomConfig {
    pub param_distributions: Vec<ParamDistributions>,
    pub n_iter: usize,
    pub random_state: Option<u64>,
    /// Ranks listed in the text summary
    pub n_top: usize,
}

impl Default for RandomConfig {
    fn default() -> Self {
        let mut dist = ParamDistributions::new();
        dist.insert("C".to_string(), Distribution::expon(100.0).into());
        dist.insert("gamma".to_string(), Distribution::expon(0.1).into());
        dist.insert("kernel".to_string(), ParamDistribution::choice(["rbf"]));
        dist.insert(
            "class_weight".to_string(),
            ParamDistribution::Choice(vec![ParamValue::from("balanced"), ParamValue::Null]),
        );
        Self {
            param_distributions: vec![dist],
            n_iter: 20,
            random_state: None,
            n_top: 3,
        }
    }
}

/// Full configuration of a tuning run. Every field has a default, so the
/// digits walkthrough runs without a configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuneConfig {
    pub estimator: EstimatorKind,
    pub data: DataConfig,
    /// Fraction of samples held out for the final classification report
    pub test_size: f64,
    /// Seed of the train/test split
    pub seed: u64,
    pub search: SearchConfig,
    pub grid: GridConfig,
    pub random: RandomConfig,
    /// CSV file receiving the cross-validation results
    pub output: Option<PathBuf>,
    /// HTML report file
    pub report: Option<PathBuf>,
}

impl Default for TuneConfig {
    fn default() -> Self {
        Self {
            estimator: EstimatorKind::Svc,
            data: DataConfig::default(),
            test_size: 0.5,
            seed: 0,
            search: SearchConfig::default(),
            grid: GridConfig::default(),
            random: RandomConfig::default(),
            output: None,
            report: None,
        }
    }
}

/// Load a tuning configuration from a JSON file.
pub fn load_tune_config<P: AsRef<Path>>(path: P) -> Result<TuneConfig> {
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: TuneConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}

impl TuneConfig {
    /// Load the configuration file (or the defaults) and apply CLI overrides.
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => load_tune_config(path)?,
            None => TuneConfig::default(),
        };

        if let Some(data) = matches.get_one::<String>("data") {
            validate_csv_file(data)?;
            config.data.path = Some(PathBuf::from(data));
        } else if let Some(path) = &config.data.path {
            validate_csv_file(&path.to_string_lossy())?;
        }

        if let Some(output) = matches.get_one::<PathBuf>("output") {
            config.output = Some(output.clone());
        }

        if let Some(report) = matches.get_one::<PathBuf>("report") {
            config.report = Some(report.clone());
        }

        if let Some(n_jobs) = matches.get_one::<usize>("n_jobs") {
            config.search.n_jobs = Some(*n_jobs);
        }

        if let Some(estimator) = matches.get_one::<String>("estimator") {
            config.estimator = EstimatorKind::from_str(estimator).map_err(anyhow::Error::msg)?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_reproduce_walkthrough() {
        let cfg = TuneConfig::default();
        assert_eq!(cfg.estimator, EstimatorKind::Svc);
        assert_eq!(cfg.grid.param_grid.len(), 2);
        assert_eq!(cfg.grid.scores, vec!["precision_macro", "recall_macro"]);
        assert_eq!(cfg.random.n_iter, 20);
        assert_eq!(cfg.test_size, 0.5);
        assert!(cfg.data.path.is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg: TuneConfig = serde_json::from_str(
            r#"{"estimator": "knn",
                "grid": {"param_grid": [{"n_neighbors": [1, 3]}]},
                "random": {"param_distributions": [{"n_neighbors": {"dist": "randint", "low": 1, "high": 4}}]}}"#,
        )
        .unwrap();
        assert_eq!(cfg.estimator, EstimatorKind::Knn);
        assert_eq!(cfg.grid.param_grid[0]["n_neighbors"].len(), 2);
        // scores were not given, so the defaults remain
        assert_eq!(cfg.grid.scores.len(), 2);
        assert_eq!(
            cfg.random.param_distributions[0]["n_neighbors"],
            ParamDistribution::Dist(Distribution::Randint { low: 1, high: 4 })
        );
    }

    #[test]
    fn test_default_config_roundtrips_through_json() {
        let json = serde_json::to_string(&TuneConfig::default()).unwrap();
        let back: TuneConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.random.param_distributions, TuneConfig::default().random.param_distributions);
    }
}
