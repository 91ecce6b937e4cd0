//! Tabular outputs of a sweep: the projected filtered rows and the per-value means.

use std::path::Path;

use crate::core::column::Column;
use crate::core::sweep::{SweepAxis, SweepResult};
use crate::core::table::ResultRow;
use crate::error::{Result, SweepError};

fn format_metric(column: Column, row: &ResultRow) -> String {
    match column {
        Column::Triangles => row.triangles.to_string(),
        Column::Leaves => row.leaves.to_string(),
        other => row.metric(other).map(|v| v.to_string()).unwrap_or_default(),
    }
}

/// Filtered rows reduced to the key column and the metric columns.
/// Rows with no value on the axis are left out.
pub fn write_projection(
    path: &Path,
    key_header: &str,
    axis: SweepAxis,
    metrics: &[Column],
    rows: &[&ResultRow],
) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| SweepError::csv(path, e))?;

    let mut header = vec![key_header.to_string()];
    header.extend(metrics.iter().map(|m| m.header().to_string()));
    writer
        .write_record(&header)
        .map_err(|e| SweepError::csv(path, e))?;

    let mut written = 0usize;
    for row in rows {
        let Some(key) = axis.key(row) else {
            continue;
        };
        let mut record = vec![key.to_string()];
        record.extend(metrics.iter().map(|&m| format_metric(m, row)));
        writer
            .write_record(&record)
            .map_err(|e| SweepError::csv(path, e))?;
        written += 1;
    }
    writer.flush().map_err(|e| SweepError::io(path, e))?;
    Ok(written)
}

/// One row per sweep value: key, row count, then one mean per metric.
pub fn write_summary(path: &Path, key_header: &str, result: &SweepResult) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| SweepError::csv(path, e))?;

    let mut header = vec![key_header.to_string(), "count".to_string()];
    header.extend(result.metrics.iter().map(|m| m.header().to_string()));
    writer
        .write_record(&header)
        .map_err(|e| SweepError::csv(path, e))?;

    for point in &result.points {
        let mut record = vec![point.key.to_string(), point.count.to_string()];
        record.extend(point.means.iter().map(|m| format!("{m:.3}")));
        writer
            .write_record(&record)
            .map_err(|e| SweepError::csv(path, e))?;
    }
    writer.flush().map_err(|e| SweepError::io(path, e))?;
    Ok(())
}
