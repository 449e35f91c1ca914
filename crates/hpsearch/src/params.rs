//! Hyper-parameter values, parameter sets and exhaustive parameter grids.
//!
//! A `ParamSet` maps parameter names to values. Keys are kept in a
//! `BTreeMap`, so every enumeration over parameter names happens in sorted
//! order; `ParameterGrid` relies on this to produce a stable candidate order.
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// A single hyper-parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    /// Numeric view of the value; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer view; floats are accepted only when they hold an integral value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            ParamValue::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParamValue::Null => write!(f, "None"),
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Str(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

/// One concrete hyper-parameter setting.
pub type ParamSet = BTreeMap<String, ParamValue>;

/// One grid: parameter name to the finite list of candidate values.
pub type ParamGrid = BTreeMap<String, Vec<ParamValue>>;

/// Render a parameter set as `{'C': 10, 'kernel': 'rbf'}`.
pub fn format_params(params: &ParamSet) -> String {
    let body = params
        .iter()
        .map(|(k, v)| format!("'{}': {}", k, v))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{}}}", body)
}

/// Build a `ParamSet` from `(name, value)` pairs.
pub fn param_set<I, K, V>(pairs: I) -> ParamSet
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<ParamValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// The union of the cross-products of a list of grids.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGrid {
    grids: Vec<ParamGrid>,
}

impl ParameterGrid {
    /// Validate and wrap a list of grids.
    ///
    /// The list must hold at least one grid, every grid must name at least one
    /// parameter and every parameter must have at least one candidate value.
    pub fn new(grids: Vec<ParamGrid>) -> Result<Self> {
        if grids.is_empty() {
            return Err(SearchError::InvalidParamSpace(
                "parameter grid list is empty".to_string(),
            ));
        }
        for (i, grid) in grids.iter().enumerate() {
            if grid.is_empty() {
                return Err(SearchError::InvalidParamSpace(format!(
                    "parameter grid {} has no parameters",
                    i
                )));
            }
            for (name, values) in grid {
                if values.is_empty() {
                    return Err(SearchError::InvalidParamSpace(format!(
                        "parameter grid for parameter '{}' needs to be a non-empty sequence",
                        name
                    )));
                }
            }
        }
        Ok(Self { grids })
    }

    pub fn grids(&self) -> &[ParamGrid] {
        &self.grids
    }

    /// Number of candidates: the sum of each grid's cross-product size.
    pub fn len(&self) -> usize {
        self.grids
            .iter()
            .map(|g| g.values().map(Vec::len).product::<usize>())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enumerate every candidate: grids in order, keys sorted, last key
    /// varying fastest.
    pub fn candidates(&self) -> Vec<ParamSet> {
        let mut out = Vec::with_capacity(self.len());
        for grid in &self.grids {
            let keys: Vec<&String> = grid.keys().collect();
            let values: Vec<&Vec<ParamValue>> = grid.values().collect();
            let mut odometer = vec![0usize; keys.len()];

            loop {
                let set: ParamSet = keys
                    .iter()
                    .zip(odometer.iter())
                    .zip(values.iter())
                    .map(|((k, &i), vals)| ((*k).clone(), vals[i].clone()))
                    .collect();
                out.push(set);

                // advance from the last key; a carry out of the first key ends the grid
                let mut pos = keys.len();
                let mut carry = true;
                while carry && pos > 0 {
                    pos -= 1;
                    odometer[pos] += 1;
                    if odometer[pos] < values[pos].len() {
                        carry = false;
                    } else {
                        odometer[pos] = 0;
                    }
                }
                if carry {
                    break;
                }
            }
        }
        out
    }
}
