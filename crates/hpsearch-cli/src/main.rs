use anyhow::Result;
use clap::{Arg, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::io::Write;
use std::path::PathBuf;

use hpsearch_cli::config::TuneConfig;
use hpsearch_cli::run::{run_grid, run_random};

fn search_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("config")
                .help("Path to the JSON tuning configuration. Defaults reproduce the digits walkthrough.")
                .required(false)
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("data")
                .short('d')
                .long("data")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help(
                    "Path to an optdigits CSV file. Overrides the data file \
                     specified in the configuration file.",
                )
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Path of the CSV file receiving the cross-validation results")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("report")
                .short('r')
                .long("report")
                .help("Path of the HTML report")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("n_jobs")
                .short('j')
                .long("n-jobs")
                .help("Number of worker threads used to evaluate candidates")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("estimator")
                .short('e')
                .long("estimator")
                .help("Override the estimator from the JSON config.")
                .value_parser(["svc", "gbdt", "knn"])
                .value_hint(ValueHint::Other),
        )
}

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("HPSEARCH_LOG", "error,hpsearch=info"))
        .init();

    let matches = Command::new("hpsearch")
        .version(clap::crate_version!())
        .author("Justin Sing <justincsing@gmail.com>")
        .about("Cross-validated hyper-parameter search for image classifiers")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(search_args(
            Command::new("grid").about("Exhaustive search over one or more parameter grids"),
        ))
        .subcommand(search_args(
            Command::new("random")
                .about("Randomized search drawing a fixed number of settings from distributions"),
        ))
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Written by {author-with-newline}Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("grid", sub_m)) => handle_search("grid", sub_m),
        Some(("random", sub_m)) => handle_search("random", sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_search(kind: &str, matches: &ArgMatches) -> Result<()> {
    match run_search(kind, matches) {
        Ok(()) => Ok(()),
        Err(e) => {
            log::error!("[hpsearch::{}] failed: {:#}", kind, e);
            std::process::exit(1)
        }
    }
}

fn run_search(kind: &str, matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    match config_path {
        Some(path) => log::info!("[hpsearch::{}] Using config: {:?}", kind, path),
        None => log::info!("[hpsearch::{}] No config provided; using defaults.", kind),
    }

    let config = TuneConfig::from_arguments(config_path, matches)?;
    log::debug!(
        "Effective config:\n{}",
        serde_json::to_string_pretty(&config).unwrap_or_default()
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match kind {
        "grid" => run_grid(&config, &mut out).map(|_| ())?,
        _ => run_random(&config, &mut out).map(|_| ())?,
    }
    out.flush()?;
    Ok(())
}
