use ndarray::{Array1, Array2};

use crate::config::SearchConfig;
use crate::error::Result;
use crate::models::estimator::Estimator;
use crate::params::{ParamGrid, ParameterGrid};
use crate::search::{HyperSearch, SearchCore};

/// Exhaustive search over the union of one or more parameter grids.
///
/// ```no_run
/// use hpsearch::config::SearchConfig;
/// use hpsearch::models::SvcClassifier;
/// use hpsearch::params::{ParamGrid, ParamValue};
/// use hpsearch::search::{GridSearchCV, HyperSearch};
/// # fn demo(x: ndarray::Array2<f64>, y: ndarray::Array1<usize>) -> hpsearch::error::Result<()> {
/// let mut grid = ParamGrid::new();
/// grid.insert("kernel".to_string(), vec![ParamValue::from("linear")]);
/// grid.insert("C".to_string(), vec![1.0.into(), 10.0.into()]);
///
/// let mut search = GridSearchCV::new(
///     Box::new(SvcClassifier::default()),
///     vec![grid],
///     SearchConfig::default(),
/// )?;
/// search.fit(&x, &y)?;
/// println!("{:?}", search.best_params());
/// # Ok(())
/// # }
/// ```
pub struct GridSearchCV {
    param_grid: ParameterGrid,
    core: SearchCore,
}

impl GridSearchCV {
    pub fn new(
        estimator: Box<dyn Estimator>,
        param_grid: Vec<ParamGrid>,
        config: SearchConfig,
    ) -> Result<Self> {
        let param_grid = ParameterGrid::new(param_grid)?;
        let core = SearchCore::new(estimator, config)?;
        Ok(GridSearchCV { param_grid, core })
    }

    pub fn param_grid(&self) -> &ParameterGrid {
        &self.param_grid
    }

    /// Number of candidates the grid expands to.
    pub fn n_candidates(&self) -> usize {
        self.param_grid.len()
    }

    /// Evaluate every grid point with cross-validation on `(x, y)`.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<&Self> {
        let grid = &self.param_grid;
        self.core.run(|| Ok(grid.candidates()), x, y)?;
        Ok(self)
    }
}

impl HyperSearch for GridSearchCV {
    fn core(&self) -> &SearchCore {
        &self.core
    }

    fn search_name(&self) -> &'static str {
        "GridSearchCV"
    }
}
