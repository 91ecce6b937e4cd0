//! Sweep extraction: filter by fixed constraints, group by the swept value,
//! average the metric columns.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::column::Column;
use crate::core::table::{ResultRow, ResultTable};
use crate::error::{Result, SweepError};

/// Column name → required value. Rows match by exact equality.
pub type FixedConstraints = BTreeMap<Column, i64>;

/// What a sweep groups by. Written in config as a column header or `Resolution`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SweepAxis {
    Column(Column),
    /// Composite `WIDTHxHEIGHT` key built from the frame size columns.
    Resolution,
}

impl SweepAxis {
    pub fn required_columns(self) -> Vec<Column> {
        match self {
            SweepAxis::Column(col) => vec![col],
            SweepAxis::Resolution => vec![Column::Width, Column::Height],
        }
    }

    pub fn key(self, row: &ResultRow) -> Option<SweepKey> {
        match self {
            SweepAxis::Column(col) => row.parameter(col).map(SweepKey::Value),
            SweepAxis::Resolution => Some(SweepKey::Resolution {
                width: row.width,
                height: row.height,
            }),
        }
    }

    pub fn default_header(self) -> &'static str {
        match self {
            SweepAxis::Column(col) => col.header(),
            SweepAxis::Resolution => "Resolution",
        }
    }

    fn covers(self, column: Column) -> bool {
        self.required_columns().contains(&column)
    }
}

impl TryFrom<String> for SweepAxis {
    type Error = String;

    fn try_from(name: String) -> std::result::Result<Self, Self::Error> {
        if name.trim().eq_ignore_ascii_case("resolution") {
            return Ok(SweepAxis::Resolution);
        }
        Column::from_header(&name)
            .map(SweepAxis::Column)
            .ok_or_else(|| format!("unknown sweep axis `{name}`"))
    }
}

impl From<SweepAxis> for String {
    fn from(axis: SweepAxis) -> Self {
        match axis {
            SweepAxis::Column(col) => col.header().to_string(),
            SweepAxis::Resolution => "Resolution".to_string(),
        }
    }
}

/// A swept value. Natural order is numeric (resolutions by width, then height).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SweepKey {
    Value(i64),
    Resolution { width: i64, height: i64 },
}

impl fmt::Display for SweepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepKey::Value(v) => write!(f, "{v}"),
            SweepKey::Resolution { width, height } => write!(f, "{width}x{height}"),
        }
    }
}

/// Output ordering of sweep points.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum KeyOrder {
    /// Ascending natural order of the keys.
    #[default]
    Natural,
    /// Follow this list of key labels; keys not listed are dropped.
    Enumerated(Vec<String>),
}

impl KeyOrder {
    pub fn from_labels(labels: Option<Vec<String>>) -> Self {
        match labels {
            Some(list) if !list.is_empty() => KeyOrder::Enumerated(list),
            _ => KeyOrder::Natural,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepRequest {
    /// Names the sweep in errors and logs.
    pub name: String,
    pub fixed: FixedConstraints,
    pub axis: SweepAxis,
    pub metrics: Vec<Column>,
    pub order: KeyOrder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepPoint {
    pub key: SweepKey,
    /// Rows averaged into this point.
    pub count: usize,
    /// One mean per requested metric, in request order.
    pub means: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    pub metrics: Vec<Column>,
    pub points: Vec<SweepPoint>,
    /// Rows averaged into some point; equals the sum of point counts.
    pub filtered_rows: usize,
    /// Rows that matched the constraints but whose value is outside the
    /// configured order.
    pub dropped_rows: usize,
}

impl SweepResult {
    pub fn mean(&self, point: &SweepPoint, metric: Column) -> Option<f64> {
        let idx = self.metrics.iter().position(|&m| m == metric)?;
        point.means.get(idx).copied()
    }

    /// `(label, mean)` pairs for one metric, in output order.
    pub fn series(&self, metric: Column) -> Vec<(String, f64)> {
        self.points
            .iter()
            .filter_map(|p| self.mean(p, metric).map(|m| (p.key.to_string(), m)))
            .collect()
    }

    pub fn keys(&self) -> Vec<SweepKey> {
        self.points.iter().map(|p| p.key.clone()).collect()
    }
}

/// Check that every column the request touches is present and usable.
pub fn validate(table: &ResultTable, request: &SweepRequest) -> Result<()> {
    let needed = request
        .fixed
        .keys()
        .copied()
        .chain(request.axis.required_columns())
        .chain(request.metrics.iter().copied());
    for column in needed {
        if !table.has_column(column) {
            return Err(SweepError::MissingColumn {
                sweep: request.name.clone(),
                column,
            });
        }
    }
    if let Some(col) = request.fixed.keys().find(|c| c.is_metric()) {
        return Err(SweepError::Config(format!(
            "sweep `{}`: metric column `{col}` cannot be a fixed constraint",
            request.name
        )));
    }
    if let Some(col) = request.metrics.iter().find(|c| !c.is_metric()) {
        return Err(SweepError::Config(format!(
            "sweep `{}`: `{col}` is a parameter, not a metric",
            request.name
        )));
    }
    if let SweepAxis::Column(col) = request.axis {
        if col.is_metric() {
            return Err(SweepError::Config(format!(
                "sweep `{}`: cannot sweep over metric `{col}`",
                request.name
            )));
        }
    }
    Ok(())
}

/// Rows satisfying every fixed constraint, in table order.
pub fn filter_rows<'a>(table: &'a ResultTable, fixed: &FixedConstraints) -> Vec<&'a ResultRow> {
    table
        .rows()
        .iter()
        .filter(|row| {
            fixed
                .iter()
                .all(|(&col, &want)| row.parameter(col) == Some(want))
        })
        .collect()
}

/// Parameters that are neither fixed nor swept but still take more than one
/// value among `rows`. Non-empty means the sweep mixes configurations.
pub fn varying_parameters(
    table: &ResultTable,
    rows: &[&ResultRow],
    fixed: &FixedConstraints,
    axis: SweepAxis,
) -> Vec<Column> {
    Column::parameters()
        .filter(|&c| table.has_column(c) && !fixed.contains_key(&c) && !axis.covers(c))
        .filter(|&c| {
            let distinct: BTreeSet<Option<i64>> = rows.iter().map(|r| r.parameter(c)).collect();
            distinct.len() > 1
        })
        .collect()
}

pub fn extract(table: &ResultTable, request: &SweepRequest) -> Result<SweepResult> {
    extract_rows(table, request).map(|(result, _)| result)
}

/// Like [`extract`], also returning the rows averaged into the result, in
/// table order.
///
/// A row takes part only if it satisfies every fixed constraint, has a value
/// on the swept axis (rows with an unset yaw do not) and, under an enumerated
/// order, its value is listed.
pub fn extract_rows<'a>(
    table: &'a ResultTable,
    request: &SweepRequest,
) -> Result<(SweepResult, Vec<&'a ResultRow>)> {
    validate(table, request)?;

    let matched = filter_rows(table, &request.fixed);
    let matched_len = matched.len();
    let keyed: Vec<(SweepKey, &ResultRow)> = matched
        .into_iter()
        .filter_map(|row| request.axis.key(row).map(|key| (key, row)))
        .collect();
    debug!(
        "sweep `{}`: {} of {} rows match fixed constraints, {} with a swept value",
        request.name,
        matched_len,
        table.len(),
        keyed.len()
    );
    if keyed.is_empty() {
        return Err(SweepError::EmptyResult {
            sweep: request.name.clone(),
        });
    }

    let n_metrics = request.metrics.len();
    let mut groups: BTreeMap<SweepKey, (usize, Vec<f64>)> = BTreeMap::new();
    for (key, row) in &keyed {
        let (count, sums) = groups
            .entry(key.clone())
            .or_insert_with(|| (0, vec![0.0; n_metrics]));
        *count += 1;
        for (sum, &metric) in sums.iter_mut().zip(&request.metrics) {
            *sum += row.metric(metric).unwrap_or(0.0);
        }
    }

    let to_point = |key: SweepKey, (count, sums): (usize, Vec<f64>)| SweepPoint {
        key,
        count,
        means: sums.into_iter().map(|s| s / count as f64).collect(),
    };

    let points: Vec<SweepPoint> = match &request.order {
        KeyOrder::Natural => groups.into_iter().map(|(k, g)| to_point(k, g)).collect(),
        KeyOrder::Enumerated(labels) => {
            let mut by_label: BTreeMap<String, (SweepKey, (usize, Vec<f64>))> = groups
                .into_iter()
                .map(|(k, g)| (k.to_string(), (k, g)))
                .collect();
            let mut ordered = Vec::with_capacity(labels.len());
            for label in labels {
                if let Some((k, g)) = by_label.remove(label.trim()) {
                    ordered.push(to_point(k, g));
                }
            }
            if !by_label.is_empty() {
                debug!(
                    "sweep `{}`: dropping values outside the configured order: {:?}",
                    request.name,
                    by_label.keys().collect::<Vec<_>>()
                );
            }
            ordered
        }
    };

    if points.is_empty() {
        return Err(SweepError::EmptyResult {
            sweep: request.name.clone(),
        });
    }

    let kept: BTreeSet<&SweepKey> = points.iter().map(|p| &p.key).collect();
    let rows: Vec<&ResultRow> = keyed
        .iter()
        .filter(|(key, _)| kept.contains(key))
        .map(|&(_, row)| row)
        .collect();
    let result = SweepResult {
        metrics: request.metrics.clone(),
        filtered_rows: rows.len(),
        dropped_rows: keyed.len() - rows.len(),
        points,
    };
    Ok((result, rows))
}
