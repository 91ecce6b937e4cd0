//! Error types shared by table loading, sweep extraction and report output.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::column::Column;

pub type Result<T> = std::result::Result<T, SweepError>;

#[derive(Error, Debug)]
pub enum SweepError {
    /// A column the sweep needs is not present in the input header.
    #[error("sweep `{sweep}`: missing required column `{}`", .column.header())]
    MissingColumn { sweep: String, column: Column },

    /// The fixed constraints matched zero rows. Not fatal for the run.
    #[error("sweep `{sweep}`: no rows match the fixed constraints")]
    EmptyResult { sweep: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A cell in the input could not be parsed as the column's type.
    #[error("line {line}: invalid `{column}` value {value:?}: {message}")]
    Parse {
        line: u64,
        column: String,
        value: String,
        message: String,
    },

    #[error("chart {}: {message}", .path.display())]
    Chart { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SweepError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    /// `EmptyResult` is reported and skipped; every other variant is a failure.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::EmptyResult { .. })
    }
}
