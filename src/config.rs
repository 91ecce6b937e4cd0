use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::column::Column;
use crate::core::sweep::{FixedConstraints, KeyOrder, SweepAxis, SweepRequest};
use crate::error::{Result, SweepError};

pub const DEFAULT_INPUT: &str = "benchmark_result.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "parsed_output";

pub const RESOLUTION_ORDER: [&str; 7] = [
    "256x144",
    "426x240",
    "640x360",
    "854x480",
    "1280x720",
    "1920x1080",
    "2560x1440",
];
pub const SHADOW_MAP_ORDER: [&str; 6] = ["128", "256", "512", "1024", "2048", "4096"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IoConfig {
    #[serde(default = "IoConfig::default_input")]
    pub input: String,
    #[serde(default = "IoConfig::default_output_dir")]
    pub output_dir: String,
}

impl IoConfig {
    fn default_input() -> String {
        DEFAULT_INPUT.to_string()
    }
    fn default_output_dir() -> String {
        DEFAULT_OUTPUT_DIR.to_string()
    }
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input: Self::default_input(),
            output_dir: Self::default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ChartFormat {
    #[default]
    Svg,
    Png,
}

impl ChartFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ChartFormat::Svg => "svg",
            ChartFormat::Png => "png",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartConfig {
    #[serde(default)]
    pub format: ChartFormat,
    #[serde(default = "ChartConfig::default_width")]
    pub width: u32,
    #[serde(default = "ChartConfig::default_height")]
    pub height: u32,
}

impl ChartConfig {
    fn default_width() -> u32 {
        1000
    }
    fn default_height() -> u32 {
        600
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            format: ChartFormat::default(),
            width: Self::default_width(),
            height: Self::default_height(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerShape {
    #[default]
    Circle,
    Square,
    None,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SeriesColor {
    #[default]
    Blue,
    Red,
    Green,
    Purple,
    Black,
}

/// One chart drawn from a stage's sweep result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartSpec {
    pub metric: Column,
    /// File name without extension.
    pub file: String,
    #[serde(default)]
    pub kind: ChartKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Legend entry; no legend when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub x_desc: String,
    #[serde(default = "ChartSpec::default_y_desc")]
    pub y_desc: String,
    #[serde(default)]
    pub color: SeriesColor,
    #[serde(default)]
    pub marker: MarkerShape,
}

impl ChartSpec {
    fn default_y_desc() -> String {
        "Время, мс".to_string()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Constraint {
    pub column: Column,
    pub value: i64,
}

/// One sweep plus where and how its outputs are written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageConfig {
    pub name: String,
    /// Output files are `<prefix>_result.csv`, `<prefix>_summary.csv`.
    pub prefix: String,
    pub sweep: SweepAxis,
    /// Header of the key column in written tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_header: Option<String>,
    pub metrics: Vec<Column>,
    /// Explicit value order; values not listed are dropped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Vec<String>>,
    #[serde(default)]
    pub fixed: Vec<Constraint>,
    #[serde(default)]
    pub charts: Vec<ChartSpec>,
}

impl StageConfig {
    pub fn key_header(&self) -> &str {
        self.key_header
            .as_deref()
            .unwrap_or_else(|| self.sweep.default_header())
    }

    pub fn request(&self) -> SweepRequest {
        SweepRequest {
            name: self.name.clone(),
            fixed: self
                .fixed
                .iter()
                .map(|c| (c.column, c.value))
                .collect::<FixedConstraints>(),
            axis: self.sweep,
            metrics: self.metrics.clone(),
            order: KeyOrder::from_labels(self.order.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepConfig {
    #[serde(default)]
    pub io: IoConfig,
    #[serde(default)]
    pub chart: ChartConfig,
    #[serde(default = "SweepConfig::default_stages")]
    pub stages: Vec<StageConfig>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            io: IoConfig::default(),
            chart: ChartConfig::default(),
            stages: Self::default_stages(),
        }
    }
}

fn fixed(pairs: &[(Column, i64)]) -> Vec<Constraint> {
    pairs
        .iter()
        .map(|&(column, value)| Constraint { column, value })
        .collect()
}

impl SweepConfig {
    /// The four benchmark stages: iterations, resolution, shadow map, camera yaw.
    pub fn default_stages() -> Vec<StageConfig> {
        let render_label = "Время рендера изображения".to_string();
        vec![
            StageConfig {
                name: "iterations".into(),
                prefix: "stage1_iterations".into(),
                sweep: SweepAxis::Column(Column::Iterations),
                key_header: None,
                fixed: fixed(&[
                    (Column::Width, 1920),
                    (Column::Height, 1080),
                    (Column::ShadowMap, 2048),
                ]),
                metrics: vec![
                    Column::GenerationTime,
                    Column::RenderTime,
                    Column::Triangles,
                    Column::Leaves,
                ],
                order: None,
                charts: vec![
                    ChartSpec {
                        metric: Column::GenerationTime,
                        file: "stage1_gen_time_plot".into(),
                        kind: ChartKind::Line,
                        caption: None,
                        label: Some("Время генерации дерева".into()),
                        x_desc: "Количество итераций L-системы".into(),
                        y_desc: ChartSpec::default_y_desc(),
                        color: SeriesColor::Blue,
                        marker: MarkerShape::Circle,
                    },
                    ChartSpec {
                        metric: Column::RenderTime,
                        file: "stage1_render_time_plot".into(),
                        kind: ChartKind::Line,
                        caption: None,
                        label: Some(render_label.clone()),
                        x_desc: "Количество итераций L-системы".into(),
                        y_desc: ChartSpec::default_y_desc(),
                        color: SeriesColor::Red,
                        marker: MarkerShape::Square,
                    },
                ],
            },
            StageConfig {
                name: "resolution".into(),
                prefix: "stage2_resolution".into(),
                sweep: SweepAxis::Resolution,
                key_header: Some("Resolution".into()),
                fixed: fixed(&[(Column::Iterations, 5), (Column::ShadowMap, 2048)]),
                metrics: vec![Column::RenderTime],
                order: Some(RESOLUTION_ORDER.map(String::from).to_vec()),
                charts: vec![ChartSpec {
                    metric: Column::RenderTime,
                    file: "stage2_resolution_plot".into(),
                    kind: ChartKind::Line,
                    caption: None,
                    label: Some(render_label),
                    x_desc: "Разрешение экрана".into(),
                    y_desc: ChartSpec::default_y_desc(),
                    color: SeriesColor::Red,
                    marker: MarkerShape::Square,
                }],
            },
            StageConfig {
                name: "shadowmap".into(),
                prefix: "stage3_shadowmap".into(),
                sweep: SweepAxis::Column(Column::ShadowMap),
                key_header: Some("ShadowMapResolution".into()),
                fixed: fixed(&[
                    (Column::Iterations, 5),
                    (Column::Width, 1920),
                    (Column::Height, 1080),
                ]),
                metrics: vec![Column::RenderTime],
                order: Some(SHADOW_MAP_ORDER.map(String::from).to_vec()),
                charts: vec![ChartSpec {
                    metric: Column::RenderTime,
                    file: "stage3_shadowmap_plot".into(),
                    kind: ChartKind::Line,
                    caption: None,
                    label: Some("Время построения изображения".into()),
                    x_desc: "Размер теневой карты".into(),
                    y_desc: ChartSpec::default_y_desc(),
                    color: SeriesColor::Blue,
                    marker: MarkerShape::Square,
                }],
            },
            StageConfig {
                name: "camera_yaw".into(),
                prefix: "stage4_camera_angle".into(),
                sweep: SweepAxis::Column(Column::CameraYaw),
                key_header: None,
                fixed: Vec::new(),
                metrics: vec![Column::RenderTime],
                order: None,
                charts: vec![ChartSpec {
                    metric: Column::RenderTime,
                    file: "stage4_camera_angle_plot".into(),
                    kind: ChartKind::Bar,
                    caption: Some("Зависимость времени рендеринга от угла обзора камеры".into()),
                    label: None,
                    x_desc: "Угол поворота камеры, градусы".into(),
                    y_desc: "Время рендеринга, мс".into(),
                    color: SeriesColor::Purple,
                    marker: MarkerShape::None,
                }],
            },
        ]
    }

    /// Stage names must be unique and every chart must plot one of its
    /// stage's metrics.
    pub fn validate(&self) -> Result<()> {
        let mut names = BTreeSet::new();
        for stage in &self.stages {
            if !names.insert(stage.name.as_str()) {
                return Err(SweepError::Config(format!(
                    "duplicate stage name `{}`",
                    stage.name
                )));
            }
            if stage.prefix.trim().is_empty() {
                return Err(SweepError::Config(format!(
                    "stage `{}` has an empty prefix",
                    stage.name
                )));
            }
            for chart in &stage.charts {
                if !stage.metrics.contains(&chart.metric) {
                    return Err(SweepError::Config(format!(
                        "stage `{}`: chart `{}` plots `{}`, which is not one of its metrics",
                        stage.name, chart.file, chart.metric
                    )));
                }
            }
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(SweepError::Config("chart size must be non-zero".into()));
        }
        Ok(())
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(text).map_err(|e| SweepError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read `path`; a missing file gets the defaults written to it, a broken
    /// one falls back to defaults with a warning.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(contents) => match Self::from_toml(&contents) {
                    Ok(cfg) => return cfg,
                    Err(err) => {
                        warn!("Failed to parse config {}: {err}. Using defaults.", path.display());
                    }
                },
                Err(err) => {
                    warn!("Failed to read config {}: {err}. Using defaults.", path.display());
                }
            }
            return Self::default();
        }

        let default_cfg = Self::default();
        match toml::to_string_pretty(&default_cfg) {
            Ok(text) => {
                let contents = format!(
                    "# benchsweep configuration. Command-line flags override [io] and [chart].\n\n{text}"
                );
                match fs::write(path, contents) {
                    Ok(()) => info!("Wrote default config to {}", path.display()),
                    Err(err) => warn!("Failed to write default config to {}: {err}", path.display()),
                }
            }
            Err(err) => warn!("Failed to serialize default config: {err}; continuing with defaults"),
        }
        default_cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_path(name: &str) -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "benchsweep_config_test_{}_{}",
            name,
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        p
    }

    #[test]
    fn defaults_describe_four_stages() {
        let cfg = SweepConfig::default();
        cfg.validate().expect("defaults are valid");
        let names: Vec<&str> = cfg.stages.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["iterations", "resolution", "shadowmap", "camera_yaw"]);
        assert_eq!(cfg.io.input, "benchmark_result.csv");
        assert_eq!(cfg.io.output_dir, "parsed_output");
        assert_eq!(cfg.chart.format, ChartFormat::Svg);

        let shadow = cfg.stages[2].request();
        assert_eq!(shadow.fixed.get(&Column::Iterations), Some(&5));
        assert_eq!(shadow.fixed.get(&Column::Width), Some(&1920));
        assert_eq!(
            shadow.order,
            KeyOrder::Enumerated(SHADOW_MAP_ORDER.map(String::from).to_vec())
        );
        assert_eq!(cfg.stages[3].request().order, KeyOrder::Natural);
    }

    #[test]
    fn load_or_default_writes_defaults_that_load_back() {
        let path = unique_path("defaults.toml");
        let _ = fs::remove_file(&path);

        let cfg = SweepConfig::load_or_default(&path);
        assert!(path.exists(), "config file should be created");
        assert_eq!(cfg, SweepConfig::default());

        let reloaded = SweepConfig::load_or_default(&path);
        assert_eq!(reloaded, cfg);

        let contents = fs::read_to_string(&path).expect("read written config");
        assert!(contents.contains("[[stages]]"));
        assert!(contents.contains("sweep = \"Resolution\""));
        assert!(contents.contains("column = \"wigth\""));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn partial_config_keeps_default_stages() {
        let cfg = SweepConfig::from_toml(
            r#"
            [io]
            input = "runs/latest.csv"

            [chart]
            format = "png"
            "#,
        )
        .expect("parse");
        assert_eq!(cfg.io.input, "runs/latest.csv");
        assert_eq!(cfg.io.output_dir, DEFAULT_OUTPUT_DIR);
        assert_eq!(cfg.chart.format, ChartFormat::Png);
        assert_eq!(cfg.stages.len(), 4);
    }

    #[test]
    fn custom_stage_parses() {
        let cfg = SweepConfig::from_toml(
            r#"
            [[stages]]
            name = "leaves"
            prefix = "leaves_vs_iterations"
            sweep = "Iterations"
            fixed = [{ column = "width", value = 640 }]
            metrics = ["Leaves"]

            [[stages.charts]]
            metric = "Leaves"
            file = "leaves_plot"
            kind = "bar"
            color = "green"
            "#,
        )
        .expect("parse");
        assert_eq!(cfg.stages.len(), 1);
        let stage = &cfg.stages[0];
        assert_eq!(stage.key_header(), "Iterations");
        let request = stage.request();
        assert_eq!(request.fixed.get(&Column::Width), Some(&640));
        assert_eq!(stage.charts[0].kind, ChartKind::Bar);
        assert_eq!(stage.charts[0].marker, MarkerShape::Circle);
    }

    #[test]
    fn chart_metric_must_belong_to_stage() {
        let err = SweepConfig::from_toml(
            r#"
            [[stages]]
            name = "x"
            prefix = "x"
            sweep = "shadowmap"
            metrics = ["RenderTime(ms)"]

            [[stages.charts]]
            metric = "Leaves"
            file = "x_plot"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, SweepError::Config(_)));
    }

    #[test]
    fn duplicate_stage_names_are_rejected() {
        let mut cfg = SweepConfig::default();
        cfg.stages[1].name = "iterations".into();
        assert!(cfg.validate().is_err());
    }
}
