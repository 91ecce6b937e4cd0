#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use benchsweep::config::SweepConfig;

pub const HEADER: &str = "Iterations,GenerationTime(ms),RenderTime(ms),Triangles,Leaves,wigth,height,shadowmap,CameraYaw";

pub fn unique_dir(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!(
        "benchsweep_{}_{}",
        name,
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    fs::create_dir_all(&path).unwrap();
    path
}

fn push_row(
    out: &mut String,
    iterations: i64,
    render_ms: f64,
    (width, height): (i64, i64),
    shadow_map: i64,
    yaw: f64,
) {
    let gen_ms = iterations as f64 * 1.5;
    let triangles = 100 * iterations;
    let leaves = 8 * iterations;
    out.push_str(&format!(
        "{iterations},{gen_ms:.3},{render_ms:.3},{triangles},{leaves},{width},{height},{shadow_map},{yaw:.1}\n"
    ));
}

/// A result table covering all four stages the way the benchmark runner
/// writes them: two runs per configuration, yaw `-1.0` outside the yaw stage.
pub fn full_suite_csv() -> String {
    let mut csv = format!("{HEADER}\n");
    for iterations in 2..=6 {
        for run in 0..2 {
            let render = 400.0 + iterations as f64 * 10.0 + run as f64;
            push_row(&mut csv, iterations, render, (1920, 1080), 2048, -1.0);
        }
    }
    for (i, res) in [(2560, 1440), (256, 144), (640, 360), (1280, 720)]
        .into_iter()
        .enumerate()
    {
        push_row(&mut csv, 5, 100.0 + i as f64, res, 2048, -1.0);
    }
    for (i, shadow) in [4096, 128, 1024, 256].into_iter().enumerate() {
        push_row(&mut csv, 5, 430.0 + i as f64, (1920, 1080), shadow, -1.0);
    }
    for yaw in [30.0, 0.0, 15.0] {
        push_row(&mut csv, 5, 500.0 + yaw, (1920, 1080), 2048, yaw);
    }
    csv
}

pub fn write_input(dir: &PathBuf, contents: &str) -> PathBuf {
    let path = dir.join("benchmark_result.csv");
    fs::write(&path, contents).unwrap();
    path
}

/// Default stages without charts, so runs do not depend on system fonts.
pub fn tables_only_config(input: &PathBuf, out_dir: &PathBuf) -> SweepConfig {
    let mut cfg = SweepConfig::default();
    cfg.io.input = input.display().to_string();
    cfg.io.output_dir = out_dir.display().to_string();
    for stage in &mut cfg.stages {
        stage.charts.clear();
    }
    cfg
}

pub fn read_lines(path: &PathBuf) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}
