//! Figure export using plotters (SVG output)
//!
//! Uses the SVG backend to avoid system font dependencies. Pixel size is
//! the configured figure size times its dpi; stroke widths and text sizes
//! are given in points and scaled by `dpi / 72`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use plotters::coord::combinators::IntoLogRange;
use plotters::coord::ranged1d::{AsRangedCoord, ValueFormatter};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_svg::SVGBackend;

use crate::color::Rgb;
use crate::config::FigureConfig;
use crate::figure::{AxisScale, Figure};

/// Where a figure requested at `path` is actually written: raster
/// extensions are swapped for `.svg`.
pub fn svg_path(path: &Path) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("svg") => path.to_path_buf(),
        _ => {
            let svg = path.with_extension("svg");
            log::warn!(
                "{} is not an SVG path, writing {} instead",
                path.display(),
                svg.display()
            );
            svg
        }
    }
}

/// Render `figure` to disk and return the written path.
pub fn write_svg(figure: &Figure, path: &Path, geometry: &FigureConfig) -> Result<PathBuf> {
    let out = svg_path(path);
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let root = SVGBackend::new(&out, geometry.pixel_size()).into_drawing_area();
    root.fill(&WHITE)?;

    let px = geometry.px_per_pt();
    let x = figure.x_range.clone();
    let y = figure.y_range.clone();
    match figure.scale {
        AxisScale::Linear => draw_chart(&root, x, y, figure, px)?,
        AxisScale::LogLog => draw_chart(&root, x.log_scale(), y.log_scale(), figure, px)?,
    }

    root.present()
        .with_context(|| format!("writing figure {}", out.display()))?;
    // The backend borrows `out` until dropped.
    drop(root);
    log::info!("figure written to {}", out.display());
    Ok(out)
}

fn rgb(c: Rgb) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

fn draw_chart<X, Y>(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    x_spec: X,
    y_spec: Y,
    figure: &Figure,
    px: f64,
) -> Result<()>
where
    X: AsRangedCoord<Value = f64>,
    Y: AsRangedCoord<Value = f64>,
    X::CoordDescType: ValueFormatter<f64>,
    Y::CoordDescType: ValueFormatter<f64>,
{
    let text_px = figure.text_pt * px;
    let pts = |v: f64| (v * px).round().max(1.0) as u32;

    let mut chart = ChartBuilder::on(root)
        .margin(pts(figure.text_pt * 0.8))
        .x_label_area_size(pts(figure.text_pt * 2.2))
        .y_label_area_size(pts(figure.text_pt * 3.5))
        .build_cartesian_2d(x_spec, y_spec)?;

    let blank = |_: &f64| String::new();
    let sci = |v: &f64| format!("{v:e}");

    let mut mesh = chart.configure_mesh();
    mesh.label_style(("sans-serif", text_px))
        .axis_desc_style(("sans-serif", text_px))
        .bold_line_style(BLACK.mix(0.15))
        .light_line_style(BLACK.mix(0.04));
    if let Some(desc) = &figure.x_desc {
        mesh.x_desc(desc.as_str());
    }
    if let Some(desc) = &figure.y_desc {
        mesh.y_desc(desc.as_str());
    }
    match (figure.scale, figure.fixed_x_ticks) {
        (AxisScale::LogLog, _) => {
            mesh.x_label_formatter(&sci).y_label_formatter(&sci);
        }
        (AxisScale::Linear, true) => {
            mesh.disable_x_mesh().x_label_formatter(&blank);
        }
        (AxisScale::Linear, false) => {}
    }
    mesh.draw()?;

    let (y0, y1) = (figure.y_range.start, figure.y_range.end);
    let dash = pts(6.0);
    let guide_style = rgb(Rgb::GRAY).mix(0.5).stroke_width(pts(1.0));
    for &g in &figure.guides {
        chart.draw_series(DashedLineSeries::new(
            vec![(g, y0), (g, y1)],
            dash,
            dash / 2,
            guide_style,
        ))?;
    }

    for series in &figure.series {
        let style = rgb(series.color).stroke_width(pts(series.width));
        let anno = if series.dashed {
            chart.draw_series(DashedLineSeries::new(
                series.points.clone(),
                pts(series.width * 3.0),
                pts(series.width * 2.0),
                style,
            ))?
        } else {
            chart.draw_series(LineSeries::new(series.points.clone(), style))?
        };
        if let Some(label) = &series.label {
            let swatch = (text_px * 1.5) as i32;
            anno.label(label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + swatch, y)], style));
        }
    }

    if figure.fixed_x_ticks {
        let offset = (text_px * 0.4) as i32;
        let font = ("sans-serif", text_px)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top));
        for tick in &figure.x_ticks {
            let (tx, ty) = chart.backend_coord(&(tick.value, y0));
            root.draw(&Text::new(tick.label.clone(), (tx, ty + offset), font.clone()))?;
        }
    }

    if !figure.legend_entries().is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font(("sans-serif", text_px * 0.85))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raster_extensions_become_svg() {
        assert_eq!(svg_path(Path::new("out/fig.png")), PathBuf::from("out/fig.svg"));
        assert_eq!(svg_path(Path::new("fig.SVG")), PathBuf::from("fig.SVG"));
        assert_eq!(svg_path(Path::new("fig")), PathBuf::from("fig.svg"));
    }

    #[test]
    fn written_path_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let figure = Figure {
            title: "empty".into(),
            x_desc: Some("x".into()),
            y_desc: None,
            x_range: 0.0..1.0,
            y_range: 0.0..1.0,
            scale: AxisScale::Linear,
            x_ticks: Vec::new(),
            fixed_x_ticks: false,
            guides: vec![0.5],
            series: Vec::new(),
            text_pt: 10.0,
        };
        let geometry = FigureConfig {
            width_in: 2.0,
            height_in: 2.0,
            dpi: 72,
        };
        let out = write_svg(&figure, &dir.path().join("nested/fig.svg"), &geometry).unwrap();
        assert_eq!(out, dir.path().join("nested/fig.svg"));
        let svg = std::fs::read_to_string(&out).unwrap();
        assert!(svg.contains("width=\"144\""));
    }
}
