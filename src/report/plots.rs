//! Sweep charts: one metric against the swept values on a categorical x axis.

use std::error::Error;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::config::{ChartConfig, ChartFormat, ChartKind, ChartSpec, MarkerShape, SeriesColor};
use crate::error::{Result, SweepError};

const PURPLE: RGBColor = RGBColor(128, 0, 128);

fn series_color(color: SeriesColor) -> RGBColor {
    match color {
        SeriesColor::Blue => BLUE,
        SeriesColor::Red => RED,
        SeriesColor::Green => GREEN,
        SeriesColor::Purple => PURPLE,
        SeriesColor::Black => BLACK,
    }
}

/// Label for an x position; only whole indices carry one.
fn label_at(labels: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

fn y_range(kind: ChartKind, values: &[f64]) -> (f64, f64) {
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    if !hi.is_finite() || !lo.is_finite() {
        return (0.0, 1.0);
    }
    match kind {
        ChartKind::Bar => (0.0, if hi > 0.0 { hi * 1.1 } else { 1.0 }),
        ChartKind::Line => {
            let span = hi - lo;
            let pad = if span > 1e-9 {
                span * 0.1
            } else {
                (hi.abs() * 0.05).max(1.0)
            };
            let bottom = if lo >= 0.0 { (lo - pad).max(0.0) } else { lo - pad };
            (bottom, hi + pad)
        }
    }
}

/// Render `series` (label, value) to `path` with the configured backend.
pub fn render_chart(
    path: &Path,
    chart: &ChartConfig,
    spec: &ChartSpec,
    series: &[(String, f64)],
) -> Result<()> {
    if series.is_empty() {
        return Err(SweepError::Chart {
            path: path.to_path_buf(),
            message: "no data points".to_string(),
        });
    }
    let size = (chart.width, chart.height);
    let drawn = match chart.format {
        ChartFormat::Svg => draw_chart(SVGBackend::new(path, size).into_drawing_area(), spec, series),
        ChartFormat::Png => {
            draw_chart(BitMapBackend::new(path, size).into_drawing_area(), spec, series)
        }
    };
    drawn.map_err(|e| SweepError::Chart {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn draw_chart<DB>(
    root: DrawingArea<DB, Shift>,
    spec: &ChartSpec,
    series: &[(String, f64)],
) -> std::result::Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let labels: Vec<String> = series.iter().map(|(l, _)| l.clone()).collect();
    let values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
    let n = series.len();
    let (y_lo, y_hi) = y_range(spec.kind, &values);
    let color = series_color(spec.color);

    let mut builder = ChartBuilder::on(&root);
    builder
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70);
    if let Some(caption) = &spec.caption {
        builder.caption(caption, ("sans-serif", 22));
    }
    let mut chart = builder.build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_lo..y_hi)?;

    let x_formatter = |x: &f64| label_at(&labels, *x);
    chart
        .configure_mesh()
        .x_labels(n)
        .x_label_formatter(&x_formatter)
        .x_desc(spec.x_desc.as_str())
        .y_desc(spec.y_desc.as_str())
        .draw()?;

    let points: Vec<(f64, f64)> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64, v))
        .collect();

    match spec.kind {
        ChartKind::Line => {
            let line = chart.draw_series(LineSeries::new(
                points.iter().copied(),
                color.stroke_width(2),
            ))?;
            if let Some(label) = &spec.label {
                line.label(label.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            }
            match spec.marker {
                MarkerShape::Circle => {
                    chart.draw_series(
                        points
                            .iter()
                            .map(|&p| Circle::new(p, 4, color.filled())),
                    )?;
                }
                MarkerShape::Square => {
                    chart.draw_series(points.iter().map(|&p| {
                        EmptyElement::at(p) + Rectangle::new([(-4, -4), (4, 4)], color.filled())
                    }))?;
                }
                MarkerShape::None => {}
            }
        }
        ChartKind::Bar => {
            let bars = chart.draw_series(points.iter().map(|&(x, y)| {
                Rectangle::new([(x - 0.4, 0.0), (x + 0.4, y)], color.mix(0.8).filled())
            }))?;
            if let Some(label) = &spec.label {
                bars.label(label.as_str()).legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.mix(0.8).filled())
                });
            }
        }
    }

    if spec.label.is_some() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_only_on_whole_indices() {
        let labels = vec!["128".to_string(), "256".to_string()];
        assert_eq!(label_at(&labels, 0.0), "128");
        assert_eq!(label_at(&labels, 1.0), "256");
        assert_eq!(label_at(&labels, 0.5), "");
        assert_eq!(label_at(&labels, 2.0), "");
        assert_eq!(label_at(&labels, -1.0), "");
    }

    #[test]
    fn bar_range_starts_at_zero() {
        let (lo, hi) = y_range(ChartKind::Bar, &[400.0, 500.0]);
        assert_eq!(lo, 0.0);
        assert!(hi > 500.0);
    }

    #[test]
    fn line_range_pads_both_sides() {
        let (lo, hi) = y_range(ChartKind::Line, &[430.0, 760.0]);
        assert!(lo < 430.0 && lo >= 0.0);
        assert!(hi > 760.0);
    }

    #[test]
    fn flat_line_still_has_height() {
        let (lo, hi) = y_range(ChartKind::Line, &[5.0, 5.0]);
        assert!(hi - lo > 0.0);
    }

    #[test]
    fn empty_series_is_rejected() {
        let spec = ChartSpec {
            metric: crate::core::column::Column::RenderTime,
            file: "empty".into(),
            kind: ChartKind::Line,
            caption: None,
            label: None,
            x_desc: String::new(),
            y_desc: String::new(),
            color: SeriesColor::Blue,
            marker: MarkerShape::None,
        };
        let err = render_chart(
            Path::new("unused.svg"),
            &ChartConfig::default(),
            &spec,
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, SweepError::Chart { .. }));
    }
}
