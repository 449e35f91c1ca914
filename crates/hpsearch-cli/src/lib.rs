//! hpsearch-cli: configuration and run helpers behind the `hpsearch` binary.
pub mod config;
pub mod run;
pub mod util;
