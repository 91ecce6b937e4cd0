use std::path::PathBuf;

use clap::Parser;

use crate::config::{ChartFormat, SweepConfig};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Benchmark result CSV (overrides config)
    #[arg(long, short = 'i', value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Directory for result tables and charts (overrides config)
    #[arg(long, short = 'o', value_name = "DIR")]
    pub outdir: Option<PathBuf>,

    /// Path to config TOML
    #[arg(long, default_value = "benchsweep.toml")]
    pub config: PathBuf,

    /// Chart image format (overrides config)
    #[arg(long, value_enum)]
    pub format: Option<ChartFormat>,

    /// Run only the named stage; repeat for several
    #[arg(long = "only", value_name = "STAGE")]
    pub only: Vec<String>,

    /// Use built-in defaults without reading or writing a config file
    #[arg(long, default_value_t = false)]
    pub no_config: bool,
}

impl Args {
    /// Command-line values take precedence over the config file.
    pub fn apply(&self, mut cfg: SweepConfig) -> SweepConfig {
        if let Some(input) = &self.input {
            cfg.io.input = input.display().to_string();
        }
        if let Some(outdir) = &self.outdir {
            cfg.io.output_dir = outdir.display().to_string();
        }
        if let Some(format) = self.format {
            cfg.chart.format = format;
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from([
            "benchsweep",
            "--input",
            "runs/a.csv",
            "--outdir",
            "out",
            "--format",
            "png",
            "--only",
            "shadowmap",
            "--only",
            "resolution",
        ]);
        let cfg = args.apply(SweepConfig::default());
        assert_eq!(cfg.io.input, "runs/a.csv");
        assert_eq!(cfg.io.output_dir, "out");
        assert_eq!(cfg.chart.format, ChartFormat::Png);
        assert_eq!(args.only, ["shadowmap", "resolution"]);
    }

    #[test]
    fn no_flags_keep_config_values() {
        let args = Args::parse_from(["benchsweep"]);
        let cfg = args.apply(SweepConfig::default());
        assert_eq!(cfg, SweepConfig::default());
        assert!(args.only.is_empty());
        assert_eq!(args.config, PathBuf::from("benchsweep.toml"));
    }
}
