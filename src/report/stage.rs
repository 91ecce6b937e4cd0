use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::config::{ChartConfig, StageConfig};
use crate::core::sweep::{extract_rows, varying_parameters};
use crate::core::table::ResultTable;
use crate::error::{Result, SweepError};
use crate::report::output::{write_projection, write_summary};
use crate::report::plots::render_chart;

#[derive(Debug)]
pub enum StageStatus {
    /// Files written, and the number of sweep points in the summary.
    Written { files: Vec<PathBuf>, points: usize },
    /// No rows matched; nothing written.
    Empty,
    Failed(SweepError),
}

#[derive(Debug)]
pub struct StageOutcome {
    pub name: String,
    pub status: StageStatus,
}

impl StageOutcome {
    pub fn files(&self) -> &[PathBuf] {
        match &self.status {
            StageStatus::Written { files, .. } => files,
            _ => &[],
        }
    }
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<StageOutcome>,
}

impl RunSummary {
    pub fn outcome(&self, name: &str) -> Option<&StageOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }

    pub fn written(&self) -> usize {
        self.count(|s| matches!(s, StageStatus::Written { .. }))
    }

    pub fn empty(&self) -> usize {
        self.count(|s| matches!(s, StageStatus::Empty))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, StageStatus::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&StageStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// Extract one stage and write its tables and charts under `out_dir`.
pub fn run_stage(
    table: &ResultTable,
    stage: &StageConfig,
    chart: &ChartConfig,
    out_dir: &Path,
) -> Result<(Vec<PathBuf>, usize)> {
    let request = stage.request();
    let (result, rows) = extract_rows(table, &request)?;
    if result.dropped_rows > 0 {
        info!(
            "stage `{}`: {} rows outside the configured order left out",
            stage.name, result.dropped_rows
        );
    }

    let varying = varying_parameters(table, &rows, &request.fixed, request.axis);
    if !varying.is_empty() {
        let names: Vec<&str> = varying.iter().map(|c| c.header()).collect();
        warn!(
            "stage `{}`: {} not fixed and take several values; means mix configurations",
            stage.name,
            names.join(", ")
        );
    }

    let mut files = Vec::new();

    let result_path = out_dir.join(format!("{}_result.csv", stage.prefix));
    let n_rows = write_projection(
        &result_path,
        stage.key_header(),
        request.axis,
        &request.metrics,
        &rows,
    )?;
    info!(
        "Saved stage `{}` data ({n_rows} rows) to {}",
        stage.name,
        result_path.display()
    );
    files.push(result_path);

    let summary_path = out_dir.join(format!("{}_summary.csv", stage.prefix));
    write_summary(&summary_path, stage.key_header(), &result)?;
    info!(
        "Saved stage `{}` summary to {}",
        stage.name,
        summary_path.display()
    );
    files.push(summary_path);

    for spec in &stage.charts {
        let plot_path = out_dir.join(format!("{}.{}", spec.file, chart.format.extension()));
        render_chart(&plot_path, chart, spec, &result.series(spec.metric))?;
        info!(
            "Saved stage `{}` {} plot to {}",
            stage.name,
            spec.metric,
            plot_path.display()
        );
        files.push(plot_path);
    }

    Ok((files, result.points.len()))
}

/// Run every stage independently. `only` restricts to the named stages when non-empty.
pub fn run_stages(
    table: &ResultTable,
    stages: &[StageConfig],
    chart: &ChartConfig,
    out_dir: &Path,
    only: &[String],
) -> RunSummary {
    let mut summary = RunSummary::default();
    for stage in stages {
        if !only.is_empty() && !only.iter().any(|n| n == &stage.name) {
            continue;
        }
        let status = match run_stage(table, stage, chart, out_dir) {
            Ok((files, points)) => {
                info!(
                    "stage `{}`: {points} points, {} files written",
                    stage.name,
                    files.len()
                );
                StageStatus::Written { files, points }
            }
            Err(err) if err.is_empty_result() => {
                warn!("Warning: no data found for stage `{}`", stage.name);
                StageStatus::Empty
            }
            Err(err) => {
                error!("stage `{}` failed: {err}", stage.name);
                StageStatus::Failed(err)
            }
        };
        summary.outcomes.push(StageOutcome {
            name: stage.name.clone(),
            status,
        });
    }
    summary
}
