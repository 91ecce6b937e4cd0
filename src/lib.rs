//! Parameter-sweep tables and charts from L-system renderer benchmark results.
//!
//! The benchmark runner writes one row per configuration (iterations, frame
//! size, shadow-map size, camera yaw) with generation and render timings.
//! Each configured stage fixes some parameters, sweeps one, and reports the
//! mean metrics per swept value.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod report;

pub use error::{Result, SweepError};
pub use report::{run, run_with_config};
