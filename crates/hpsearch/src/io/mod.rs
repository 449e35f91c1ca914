//! IO utilities for loading image datasets and exporting search results.

pub mod cv_results;
pub mod digits;

pub use cv_results::{write_cv_results, write_cv_results_csv};
pub use digits::{read_optdigits_csv, DatasetSource, OptDigitsCsv, SyntheticDigits};
