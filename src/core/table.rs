//! Benchmark result table: typed rows plus the set of columns the input carried.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::core::column::Column;
use crate::error::{Result, SweepError};

/// Yaw the runner writes for rows recorded outside the camera stage.
pub const NO_YAW: i64 = -1;

/// One benchmark observation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultRow {
    pub iterations: i64,
    pub generation_ms: f64,
    pub render_ms: f64,
    pub triangles: u64,
    pub leaves: u64,
    pub width: i64,
    pub height: i64,
    pub shadow_map: i64,
    /// `None` when the runner did not record a yaw (it writes [`NO_YAW`]).
    pub camera_yaw: Option<i64>,
}

impl ResultRow {
    /// Integer value of a parameter column. Metric columns return `None`.
    pub fn parameter(&self, column: Column) -> Option<i64> {
        match column {
            Column::Iterations => Some(self.iterations),
            Column::Width => Some(self.width),
            Column::Height => Some(self.height),
            Column::ShadowMap => Some(self.shadow_map),
            Column::CameraYaw => self.camera_yaw,
            _ => None,
        }
    }

    /// Numeric value of a metric column. Parameter columns return `None`.
    pub fn metric(&self, column: Column) -> Option<f64> {
        match column {
            Column::GenerationTime => Some(self.generation_ms),
            Column::RenderTime => Some(self.render_ms),
            Column::Triangles => Some(self.triangles as f64),
            Column::Leaves => Some(self.leaves as f64),
            _ => None,
        }
    }

    /// The frame size as `WIDTHxHEIGHT`.
    pub fn resolution_label(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    columns: BTreeSet<Column>,
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn new(columns: impl IntoIterator<Item = Column>, rows: Vec<ResultRow>) -> Self {
        Self {
            columns: columns.into_iter().collect(),
            rows,
        }
    }

    /// A table that claims every column, for rows built in code.
    pub fn with_all_columns(rows: Vec<ResultRow>) -> Self {
        Self::new(Column::ALL, rows)
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| SweepError::io(path, e))?;
        Self::from_reader(file, path)
    }

    /// Parse CSV text. `source` only labels errors.
    ///
    /// Files from older runner builds list eight header fields but append the
    /// camera yaw as an unnamed ninth field; that field is read as `CameraYaw`.
    pub fn from_reader<R: Read>(reader: R, source: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| SweepError::csv(source, e))?
            .clone();

        let mut col_idx: BTreeMap<Column, usize> = BTreeMap::new();
        for (i, name) in headers.iter().enumerate() {
            match Column::from_header(name) {
                Some(col) => {
                    col_idx.entry(col).or_insert(i);
                }
                None if !name.is_empty() => debug!("ignoring unknown column `{name}`"),
                None => {}
            }
        }
        let unnamed_yaw_idx = if col_idx.contains_key(&Column::CameraYaw) {
            None
        } else {
            Some(headers.len())
        };
        // Every named field must be present; a trailing yaw may be left off.
        let named = (0..headers.len())
            .rev()
            .find(|&i| !headers[i].is_empty())
            .map_or(0, |i| i + 1);
        let required = match col_idx.get(&Column::CameraYaw) {
            Some(&i) if i + 1 == named => i,
            _ => named,
        };

        let mut columns: BTreeSet<Column> = col_idx.keys().copied().collect();
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| SweepError::csv(source, e))?;
            if record.iter().all(|cell| cell.is_empty()) {
                continue;
            }
            let line = record.position().map_or(0, |p| p.line());
            if record.len() < required {
                return Err(SweepError::Parse {
                    line,
                    column: headers.get(record.len()).unwrap_or_default().to_string(),
                    value: String::new(),
                    message: format!("row has {} of {required} fields", record.len()),
                });
            }
            let cell = |col: Column| col_idx.get(&col).and_then(|&i| record.get(i));

            let mut row = ResultRow::default();
            if let Some(v) = cell(Column::Iterations) {
                row.iterations = parse_int(v, line, Column::Iterations)?;
            }
            if let Some(v) = cell(Column::GenerationTime) {
                row.generation_ms = parse_float(v, line, Column::GenerationTime)?;
            }
            if let Some(v) = cell(Column::RenderTime) {
                row.render_ms = parse_float(v, line, Column::RenderTime)?;
            }
            if let Some(v) = cell(Column::Triangles) {
                row.triangles = parse_count(v, line, Column::Triangles)?;
            }
            if let Some(v) = cell(Column::Leaves) {
                row.leaves = parse_count(v, line, Column::Leaves)?;
            }
            if let Some(v) = cell(Column::Width) {
                row.width = parse_int(v, line, Column::Width)?;
            }
            if let Some(v) = cell(Column::Height) {
                row.height = parse_int(v, line, Column::Height)?;
            }
            if let Some(v) = cell(Column::ShadowMap) {
                row.shadow_map = parse_int(v, line, Column::ShadowMap)?;
            }
            let yaw_cell = cell(Column::CameraYaw)
                .or_else(|| unnamed_yaw_idx.and_then(|i| record.get(i)));
            if let Some(v) = yaw_cell {
                if unnamed_yaw_idx.is_some() {
                    columns.insert(Column::CameraYaw);
                }
                if !v.is_empty() {
                    let yaw = parse_int(v, line, Column::CameraYaw)?;
                    row.camera_yaw = (yaw != NO_YAW).then_some(yaw);
                }
            }
            rows.push(row);
        }

        debug!(
            "loaded {} rows from {} ({} known columns)",
            rows.len(),
            source.display(),
            columns.len()
        );
        Ok(Self { columns, rows })
    }
}

fn parse_error(value: &str, line: u64, column: Column, message: impl ToString) -> SweepError {
    SweepError::Parse {
        line,
        column: column.header().to_string(),
        value: value.to_string(),
        message: message.to_string(),
    }
}

fn parse_float(value: &str, line: u64, column: Column) -> Result<f64> {
    let x = value
        .parse::<f64>()
        .map_err(|e| parse_error(value, line, column, e))?;
    if x.is_finite() {
        Ok(x)
    } else {
        Err(parse_error(value, line, column, "non-finite value"))
    }
}

/// Integers may be written with a zero fraction (`15.0`).
fn parse_int(value: &str, line: u64, column: Column) -> Result<i64> {
    if let Ok(v) = value.parse::<i64>() {
        return Ok(v);
    }
    let x = parse_float(value, line, column)?;
    if x.fract() == 0.0 && x.abs() < i64::MAX as f64 {
        Ok(x as i64)
    } else {
        Err(parse_error(value, line, column, "expected an integer"))
    }
}

fn parse_count(value: &str, line: u64, column: Column) -> Result<u64> {
    let v = parse_int(value, line, column)?;
    u64::try_from(v).map_err(|_| parse_error(value, line, column, "expected a non-negative count"))
}
