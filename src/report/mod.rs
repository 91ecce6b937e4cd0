//! Report generation: load the result table once, then write each stage's
//! tables and charts.

pub mod output;
pub mod plots;
pub mod stage;

use std::fs::create_dir_all;
use std::path::Path;

use tracing::{info, warn};

use crate::config::SweepConfig;
use crate::core::table::ResultTable;
use crate::error::{Result, SweepError};
use stage::{RunSummary, run_stages};

/// Process `input` with the default stages, writing into `output_dir`.
pub fn run(input: &Path, output_dir: &Path) -> Result<RunSummary> {
    let mut cfg = SweepConfig::default();
    cfg.io.input = input.display().to_string();
    cfg.io.output_dir = output_dir.display().to_string();
    run_with_config(&cfg, &[])
}

/// Process the input named in `cfg`. Failing to read the input or create the
/// output directory is fatal; individual stage failures are collected.
pub fn run_with_config(cfg: &SweepConfig, only: &[String]) -> Result<RunSummary> {
    cfg.validate()?;
    for name in only {
        if !cfg.stages.iter().any(|s| &s.name == name) {
            return Err(SweepError::Config(format!("unknown stage `{name}`")));
        }
    }

    let input = Path::new(&cfg.io.input);
    let out_dir = Path::new(&cfg.io.output_dir);
    create_dir_all(out_dir).map_err(|e| SweepError::io(out_dir, e))?;

    info!("Reading data from {}...", input.display());
    let table = ResultTable::load(input)?;
    if table.is_empty() {
        warn!("{} contains no data rows", input.display());
    }

    let summary = run_stages(&table, &cfg.stages, &cfg.chart, out_dir, only);
    info!(
        "Processing completed: {} written, {} empty, {} failed. Output files are in {}",
        summary.written(),
        summary.empty(),
        summary.failed(),
        out_dir.display()
    );
    Ok(summary)
}
