//! Sampling rules for randomized search.
//!
//! Each parameter is either a finite list (uniform choice) or a continuous /
//! integer distribution. Continuous draws delegate to `statrs`, integer draws
//! to `rand`.
use std::collections::BTreeMap;

use rand::distributions::Distribution as RandDistribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use statrs::distribution::{Exp, Normal, Uniform};

use crate::error::{Result, SearchError};
use crate::params::{ParamSet, ParamValue};

/// A random variable with a fixed configuration, named after the usual
/// `scipy.stats` parameterisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dist", rename_all = "snake_case")]
pub enum Distribution {
    /// Exponential with rate `1 / scale`, shifted by `loc`
    Expon {
        #[serde(default)]
        loc: f64,
        scale: f64,
    },
    /// Uniform on `[loc, loc + scale]`
    Uniform {
        #[serde(default)]
        loc: f64,
        scale: f64,
    },
    Norm {
        #[serde(default)]
        loc: f64,
        scale: f64,
    },
    /// Log-uniform on `[low, high]`
    Loguniform { low: f64, high: f64 },
    /// Integers in `[low, high)`
    Randint { low: i64, high: i64 },
}

impl Distribution {
    pub fn expon(scale: f64) -> Self {
        Distribution::Expon { loc: 0.0, scale }
    }

    /// Check the configuration without drawing.
    pub fn validate(&self) -> Result<()> {
        if let Distribution::Expon { scale, .. }
        | Distribution::Uniform { scale, .. }
        | Distribution::Norm { scale, .. } = *self
        {
            if !(scale > 0.0 && scale.is_finite()) {
                return Err(SearchError::InvalidParamSpace(format!(
                    "distribution scale must be positive and finite, got {}",
                    scale
                )));
            }
        }
        match *self {
            Distribution::Expon { scale, .. } => {
                Exp::new(1.0 / scale).map_err(|e| invalid("expon", e))?;
            }
            Distribution::Uniform { loc, scale } => {
                Uniform::new(loc, loc + scale).map_err(|e| invalid("uniform", e))?;
            }
            Distribution::Norm { loc, scale } => {
                Normal::new(loc, scale).map_err(|e| invalid("norm", e))?;
            }
            Distribution::Loguniform { low, high } => {
                if !(low > 0.0 && high > low) {
                    return Err(SearchError::InvalidParamSpace(format!(
                        "loguniform requires 0 < low < high, got low={} high={}",
                        low, high
                    )));
                }
            }
            Distribution::Randint { low, high } => {
                if high <= low {
                    return Err(SearchError::InvalidParamSpace(format!(
                        "randint requires low < high, got low={} high={}",
                        low, high
                    )));
                }
            }
        }
        Ok(())
    }

    /// Draw one independent variate.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<ParamValue> {
        let value = match *self {
            Distribution::Expon { loc, scale } => {
                let d = Exp::new(1.0 / scale).map_err(|e| invalid("expon", e))?;
                ParamValue::Float(loc + d.sample(rng))
            }
            Distribution::Uniform { loc, scale } => {
                let d = Uniform::new(loc, loc + scale).map_err(|e| invalid("uniform", e))?;
                ParamValue::Float(d.sample(rng))
            }
            Distribution::Norm { loc, scale } => {
                let d = Normal::new(loc, scale).map_err(|e| invalid("norm", e))?;
                ParamValue::Float(d.sample(rng))
            }
            Distribution::Loguniform { low, high } => {
                self.validate()?;
                let d = Uniform::new(low.ln(), high.ln()).map_err(|e| invalid("loguniform", e))?;
                ParamValue::Float(d.sample(rng).exp())
            }
            Distribution::Randint { low, high } => {
                self.validate()?;
                ParamValue::Int(rng.gen_range(low..high))
            }
        };
        Ok(value)
    }
}

fn invalid(name: &str, err: impl std::fmt::Display) -> SearchError {
    SearchError::InvalidParamSpace(format!("invalid {} distribution: {}", name, err))
}

/// Sampling rule for one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamDistribution {
    Choice(Vec<ParamValue>),
    Dist(Distribution),
}

impl ParamDistribution {
    pub fn choice<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        ParamDistribution::Choice(values.into_iter().map(Into::into).collect())
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<ParamValue> {
        match self {
            ParamDistribution::Choice(values) => {
                if values.is_empty() {
                    return Err(SearchError::InvalidParamSpace(
                        "choice list is empty".to_string(),
                    ));
                }
                Ok(values[rng.gen_range(0..values.len())].clone())
            }
            ParamDistribution::Dist(d) => d.sample(rng),
        }
    }
}

impl From<Distribution> for ParamDistribution {
    fn from(d: Distribution) -> Self {
        ParamDistribution::Dist(d)
    }
}

/// Parameter name to sampling rule.
pub type ParamDistributions = BTreeMap<String, ParamDistribution>;

/// Draws a fixed number of independent parameter settings.
///
/// Settings are drawn with replacement and never deduplicated, so exactly
/// `n_iter` settings come out regardless of how small the space is.
#[derive(Debug, Clone)]
pub struct ParameterSampler {
    distributions: Vec<ParamDistributions>,
    n_iter: usize,
    random_state: Option<u64>,
}

impl ParameterSampler {
    pub fn new(
        distributions: Vec<ParamDistributions>,
        n_iter: usize,
        random_state: Option<u64>,
    ) -> Result<Self> {
        if n_iter == 0 {
            return Err(SearchError::InvalidParamSpace(
                "n_iter must be at least 1".to_string(),
            ));
        }
        if distributions.is_empty() {
            return Err(SearchError::InvalidParamSpace(
                "parameter distribution list is empty".to_string(),
            ));
        }
        for (i, dist) in distributions.iter().enumerate() {
            if dist.is_empty() {
                return Err(SearchError::InvalidParamSpace(format!(
                    "parameter distribution {} has no parameters",
                    i
                )));
            }
            for (name, rule) in dist {
                match rule {
                    ParamDistribution::Choice(values) if values.is_empty() => {
                        return Err(SearchError::InvalidParamSpace(format!(
                            "candidate list for parameter '{}' is empty",
                            name
                        )));
                    }
                    ParamDistribution::Dist(d) => d.validate()?,
                    _ => {}
                }
            }
        }
        Ok(Self {
            distributions,
            n_iter,
            random_state,
        })
    }

    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    /// Draw `n_iter` settings. Parameters are drawn in sorted key order.
    pub fn sample(&self) -> Result<Vec<ParamSet>> {
        let mut rng = match self.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut out = Vec::with_capacity(self.n_iter);
        for _ in 0..self.n_iter {
            let dist = if self.distributions.len() == 1 {
                &self.distributions[0]
            } else {
                &self.distributions[rng.gen_range(0..self.distributions.len())]
            };
            let mut setting = ParamSet::new();
            for (name, rule) in dist {
                setting.insert(name.clone(), rule.sample(&mut rng)?);
            }
            out.push(setting);
        }
        Ok(out)
    }
}
