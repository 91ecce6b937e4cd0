// Entry point: reads the benchmark table and writes per-stage tables and charts.
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use benchsweep::cli::Args;
use benchsweep::config::SweepConfig;
use benchsweep::run_with_config;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let base = if args.no_config {
        SweepConfig::default()
    } else {
        SweepConfig::load_or_default(&args.config)
    };
    let cfg = args.apply(base);

    match run_with_config(&cfg, &args.only) {
        Ok(summary) if summary.failed() == 0 => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(2),
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
