use linfa::dataset::Pr;
use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_svm::{Svm, SvmParams};
use ndarray::{Array1, Array2};
use statrs::statistics::Statistics;

use crate::error::{Result, SearchError};
use crate::models::estimator::{
    argmax, check_fit_input, classes_of, expect_f64, expect_str, expect_usize, unknown, Estimator,
};
use crate::params::{ParamSet, ParamValue};

const NAME: &str = "SVC";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kernel {
    Linear,
    Rbf,
    Poly,
}

impl Kernel {
    fn parse(s: &str) -> Result<Self> {
        match s {
            "linear" => Ok(Kernel::Linear),
            "rbf" | "gauss" => Ok(Kernel::Rbf),
            "poly" => Ok(Kernel::Poly),
            _ => Err(SearchError::Estimator(format!(
                "Unsupported kernel type: {}. Valid options are: linear, rbf, poly",
                s
            ))),
        }
    }
}

/// Kernel coefficient for `rbf` and `poly`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gamma {
    /// `1 / (n_features * x.var())`
    Scale,
    /// `1 / n_features`
    Auto,
    Value(f64),
}

/// Hyper-parameters of the support vector classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct SvcParams {
    pub kernel: String,
    pub c: f64,
    pub gamma: Gamma,
    pub degree: usize,
    pub coef0: f64,
    pub tol: f64,
    /// `None` or `Some("balanced")`
    pub class_weight: Option<String>,
}

impl Default for SvcParams {
    fn default() -> Self {
        Self {
            kernel: "rbf".to_string(),
            c: 1.0,
            gamma: Gamma::Scale,
            degree: 3,
            coef0: 0.0,
            tol: 1e-3,
            class_weight: None,
        }
    }
}

struct FittedSvc {
    classes: Vec<usize>,
    /// One Platt-scaled model per positive class; a single model when binary
    models: Vec<Svm<f64, Pr>>,
    kernel: Kernel,
    gamma: f64,
    n_features: usize,
}

/// Support vector classifier backed by `linfa-svm`.
///
/// Binary problems train one model for the larger class id; multi-class
/// problems train one-vs-rest and predict the class with the highest
/// Platt-scaled probability.
pub struct SvcClassifier {
    params: SvcParams,
    fitted: Option<FittedSvc>,
}

impl SvcClassifier {
    pub fn new(params: SvcParams) -> Self {
        SvcClassifier {
            params,
            fitted: None,
        }
    }

    pub fn params(&self) -> &SvcParams {
        &self.params
    }

    fn resolve_gamma(&self, x: &Array2<f64>) -> Result<f64> {
        let n_features = x.ncols() as f64;
        let gamma = match self.params.gamma {
            Gamma::Value(g) => g,
            Gamma::Auto => 1.0 / n_features,
            Gamma::Scale => {
                let var = x.iter().population_variance();
                if var > 0.0 {
                    1.0 / (n_features * var)
                } else {
                    1.0
                }
            }
        };
        if !(gamma > 0.0 && gamma.is_finite()) {
            return Err(SearchError::Estimator(format!(
                "gamma must be positive, got {}",
                gamma
            )));
        }
        Ok(gamma)
    }

    /// (positive, negative) multipliers of C for one binary sub-problem.
    fn class_weights(&self, targets: &Array1<bool>) -> Result<(f64, f64)> {
        match self.params.class_weight.as_deref() {
            None => Ok((1.0, 1.0)),
            Some("balanced") => {
                let n = targets.len() as f64;
                let n_pos = targets.iter().filter(|&&t| t).count() as f64;
                let n_neg = n - n_pos;
                Ok((n / (2.0 * n_pos.max(1.0)), n / (2.0 * n_neg.max(1.0))))
            }
            Some(other) => Err(SearchError::Estimator(format!(
                "class_weight must be null or 'balanced', got '{}'",
                other
            ))),
        }
    }
}

impl Default for SvcClassifier {
    fn default() -> Self {
        Self::new(SvcParams::default())
    }
}

/// Polynomial kernels are computed as `(gamma * <x, y> + coef0)^degree`;
/// scaling the records by `sqrt(gamma)` lets linfa's `(<x, y> + c)^d` match.
fn kernel_records(x: &Array2<f64>, kernel: Kernel, gamma: f64) -> Option<Array2<f64>> {
    match kernel {
        Kernel::Poly => Some(x * gamma.sqrt()),
        _ => None,
    }
}

impl Estimator for SvcClassifier {
    fn name(&self) -> &str {
        NAME
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        check_fit_input(x, y)?;
        self.fitted = None;

        let kernel = Kernel::parse(&self.params.kernel)?;
        if !(self.params.c > 0.0) {
            return Err(SearchError::Estimator(format!(
                "C must be positive, got {}",
                self.params.c
            )));
        }
        if !(self.params.tol > 0.0) {
            return Err(SearchError::Estimator(format!(
                "tol must be positive, got {}",
                self.params.tol
            )));
        }
        if kernel == Kernel::Poly && self.params.degree == 0 {
            return Err(SearchError::Estimator("degree must be at least 1".to_string()));
        }

        let classes = classes_of(y);
        if classes.len() < 2 {
            return Err(SearchError::Estimator(format!(
                "SVC requires at least 2 distinct classes, got {}",
                classes.len()
            )));
        }

        let gamma = self.resolve_gamma(x)?;
        let scaled = kernel_records(x, kernel, gamma);
        let records = scaled.as_ref().unwrap_or(x);

        // Binary problems only need the model for the second class
        let positives: Vec<usize> = if classes.len() == 2 {
            vec![classes[1]]
        } else {
            classes.clone()
        };

        let mut models = Vec::with_capacity(positives.len());
        for &class in &positives {
            let targets = y.mapv(|l| l == class);
            let (w_pos, w_neg) = self.class_weights(&targets)?;

            let mut model: SvmParams<f64, Pr> = Svm::<f64, Pr>::params()
                .eps(self.params.tol)
                .pos_neg_weights(self.params.c * w_pos, self.params.c * w_neg);

            model = match kernel {
                Kernel::Linear => model.linear_kernel(),
                Kernel::Rbf => model.gaussian_kernel(1.0 / gamma),
                Kernel::Poly => {
                    model.polynomial_kernel(self.params.coef0, self.params.degree as f64)
                }
            };

            let dataset = Dataset::new(records.to_owned(), targets);
            let svm = <SvmParams<f64, Pr> as Fit<_, _, _>>::fit(&model, &dataset).map_err(|e| {
                SearchError::Estimator(format!("SVM fit failed for class {}: {}", class, e))
            })?;
            log::trace!(
                "Fitted {} one-vs-rest model for class {} with {} support vectors",
                NAME,
                class,
                svm.nsupport()
            );
            models.push(svm);
        }

        self.fitted = Some(FittedSvc {
            classes,
            models,
            kernel,
            gamma,
            n_features: x.ncols(),
        });
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or_else(|| SearchError::NotFitted(NAME.to_string()))?;
        if x.ncols() != fitted.n_features {
            return Err(SearchError::InvalidInput(format!(
                "X has {} features, but {} was fitted with {}",
                x.ncols(),
                NAME,
                fitted.n_features
            )));
        }

        let scaled = kernel_records(x, fitted.kernel, fitted.gamma);
        let records = scaled.as_ref().unwrap_or(x);

        let probabilities: Vec<Vec<f64>> = fitted
            .models
            .iter()
            .map(|model| {
                let pr: Array1<Pr> = model.predict(records);
                pr.iter().map(|p| f64::from(**p)).collect()
            })
            .collect();

        let predictions = if fitted.models.len() == 1 {
            probabilities[0]
                .iter()
                .map(|&p| {
                    if p >= 0.5 {
                        fitted.classes[1]
                    } else {
                        fitted.classes[0]
                    }
                })
                .collect::<Vec<usize>>()
        } else {
            (0..x.nrows())
                .map(|row| {
                    let scores: Vec<f64> = probabilities.iter().map(|p| p[row]).collect();
                    fitted.classes[argmax(&scores)]
                })
                .collect::<Vec<usize>>()
        };

        Ok(Array1::from_vec(predictions))
    }

    fn get_params(&self) -> ParamSet {
        let mut params = ParamSet::new();
        params.insert("C".to_string(), ParamValue::Float(self.params.c));
        params.insert(
            "class_weight".to_string(),
            match &self.params.class_weight {
                Some(w) => ParamValue::Str(w.clone()),
                None => ParamValue::Null,
            },
        );
        params.insert("coef0".to_string(), ParamValue::Float(self.params.coef0));
        params.insert("degree".to_string(), ParamValue::Int(self.params.degree as i64));
        params.insert(
            "gamma".to_string(),
            match self.params.gamma {
                Gamma::Scale => ParamValue::from("scale"),
                Gamma::Auto => ParamValue::from("auto"),
                Gamma::Value(g) => ParamValue::Float(g),
            },
        );
        params.insert("kernel".to_string(), ParamValue::Str(self.params.kernel.clone()));
        params.insert("tol".to_string(), ParamValue::Float(self.params.tol));
        params
    }

    fn set_params(&mut self, params: &ParamSet) -> Result<()> {
        let mut next = self.params.clone();
        for (name, value) in params {
            match name.as_str() {
                "C" => next.c = expect_f64(name, value)?,
                "kernel" => next.kernel = expect_str(name, value)?,
                "degree" => next.degree = expect_usize(name, value)?,
                "coef0" => next.coef0 = expect_f64(name, value)?,
                "tol" => next.tol = expect_f64(name, value)?,
                "gamma" => {
                    next.gamma = match value {
                        ParamValue::Str(s) if s == "scale" => Gamma::Scale,
                        ParamValue::Str(s) if s == "auto" => Gamma::Auto,
                        other => Gamma::Value(expect_f64(name, other).map_err(|_| {
                            SearchError::InvalidParameter {
                                name: name.clone(),
                                reason: format!(
                                    "expected 'scale', 'auto' or a number, got {}",
                                    other
                                ),
                            }
                        })?),
                    }
                }
                "class_weight" => {
                    next.class_weight = match value {
                        ParamValue::Null => None,
                        other => Some(expect_str(name, other)?),
                    }
                }
                _ => return Err(unknown(NAME, name)),
            }
        }
        self.params = next;
        self.fitted = None;
        Ok(())
    }

    fn clone_unfitted(&self) -> Box<dyn Estimator> {
        Box::new(SvcClassifier::new(self.params.clone()))
    }

    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }
}
