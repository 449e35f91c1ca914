use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use ndarray::{Array1, Array2};

use crate::error::{Result, SearchError};
use crate::models::estimator::{
    argmax, check_fit_input, classes_of, expect_f64, expect_usize, unknown, Estimator,
};
use crate::params::{ParamSet, ParamValue};

const NAME: &str = "GradientBoostingClassifier";

#[derive(Debug, Clone, PartialEq)]
pub struct GbdtParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
}

impl Default for GbdtParams {
    fn default() -> Self {
        Self {
            n_estimators: 50,
            max_depth: 3,
            learning_rate: 0.1,
        }
    }
}

/// Gradient Boosting Decision Tree (GBDT) classifier, one-vs-rest over the
/// `gbdt` crate's log-likelihood booster.
pub struct GbdtClassifier {
    params: GbdtParams,
    models: Option<Vec<GBDT>>,
    classes: Vec<usize>,
    n_features: usize,
}

impl GbdtClassifier {
    pub fn new(params: GbdtParams) -> Self {
        GbdtClassifier {
            params,
            models: None,
            classes: Vec::new(),
            n_features: 0,
        }
    }

    fn config(&self, feature_size: usize) -> Config {
        let mut config = Config::new();
        config.set_feature_size(feature_size);
        config.set_shrinkage(self.params.learning_rate as f32);
        config.set_max_depth(self.params.max_depth as u32);
        config.set_iterations(self.params.n_estimators);
        config.set_debug(false);
        config.set_training_optimization_level(2);
        config.set_loss("LogLikelyhood");
        config
    }
}

impl Default for GbdtClassifier {
    fn default() -> Self {
        Self::new(GbdtParams::default())
    }
}

fn to_data(x: &Array2<f64>, labels: Option<&[f32]>) -> DataVec {
    let mut data = DataVec::new();
    for (i, row) in x.rows().into_iter().enumerate() {
        let features: Vec<f32> = row.iter().map(|&v| v as f32).collect();
        let label = labels.map(|l| l[i]).unwrap_or(0.0);
        data.push(Data::new_training_data(features, 1.0, label, None));
    }
    data
}

impl Estimator for GbdtClassifier {
    fn name(&self) -> &str {
        NAME
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        check_fit_input(x, y)?;
        self.models = None;

        if self.params.n_estimators == 0 {
            return Err(SearchError::Estimator(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        if self.params.max_depth == 0 {
            return Err(SearchError::Estimator("max_depth must be at least 1".to_string()));
        }
        if !(self.params.learning_rate > 0.0) {
            return Err(SearchError::Estimator(format!(
                "learning_rate must be positive, got {}",
                self.params.learning_rate
            )));
        }

        let classes = classes_of(y);
        if classes.len() < 2 {
            return Err(SearchError::Estimator(format!(
                "{} requires at least 2 distinct classes, got {}",
                NAME,
                classes.len()
            )));
        }

        let positives: Vec<usize> = if classes.len() == 2 {
            vec![classes[1]]
        } else {
            classes.clone()
        };

        let config = self.config(x.ncols());
        let mut models = Vec::with_capacity(positives.len());
        for &class in &positives {
            // log-likelihood loss expects labels in {-1, 1}
            let labels: Vec<f32> = y
                .iter()
                .map(|&l| if l == class { 1.0 } else { -1.0 })
                .collect();
            let mut train_x = to_data(x, Some(&labels));
            let mut gbdt = GBDT::new(&config);
            gbdt.fit(&mut train_x);
            models.push(gbdt);
        }

        self.classes = classes;
        self.n_features = x.ncols();
        self.models = Some(models);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let models = self
            .models
            .as_ref()
            .ok_or_else(|| SearchError::NotFitted(NAME.to_string()))?;
        if x.ncols() != self.n_features {
            return Err(SearchError::InvalidInput(format!(
                "X has {} features, but {} was fitted with {}",
                x.ncols(),
                NAME,
                self.n_features
            )));
        }

        let test_x = to_data(x, None);
        let scores: Vec<Vec<f32>> = models.iter().map(|m| m.predict(&test_x)).collect();

        let predictions: Vec<usize> = (0..x.nrows())
            .map(|row| {
                if models.len() == 1 {
                    // probability of the second class
                    if scores[0][row] >= 0.5 {
                        self.classes[1]
                    } else {
                        self.classes[0]
                    }
                } else {
                    let row_scores: Vec<f64> = scores.iter().map(|s| s[row] as f64).collect();
                    self.classes[argmax(&row_scores)]
                }
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    fn get_params(&self) -> ParamSet {
        let mut params = ParamSet::new();
        params.insert(
            "learning_rate".to_string(),
            ParamValue::Float(self.params.learning_rate),
        );
        params.insert("max_depth".to_string(), ParamValue::Int(self.params.max_depth as i64));
        params.insert(
            "n_estimators".to_string(),
            ParamValue::Int(self.params.n_estimators as i64),
        );
        params
    }

    fn set_params(&mut self, params: &ParamSet) -> Result<()> {
        let mut next = self.params.clone();
        for (name, value) in params {
            match name.as_str() {
                "n_estimators" => next.n_estimators = expect_usize(name, value)?,
                "max_depth" => next.max_depth = expect_usize(name, value)?,
                "learning_rate" => next.learning_rate = expect_f64(name, value)?,
                _ => return Err(unknown(NAME, name)),
            }
        }
        self.params = next;
        self.models = None;
        Ok(())
    }

    fn clone_unfitted(&self) -> Box<dyn Estimator> {
        Box::new(GbdtClassifier::new(self.params.clone()))
    }

    fn is_fitted(&self) -> bool {
        self.models.is_some()
    }
}
