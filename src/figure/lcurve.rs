use std::ops::Range;

use super::{AxisScale, Figure, Series};
use crate::color::generate_palette;
use crate::config::LossCurveConfig;
use crate::data::lcurve::LossCurveError;
use crate::data::model::{finite_bounds, LossTable};

const LINE_WIDTH_PT: f64 = 1.5;
const TEXT_PT: f64 = 10.0;

/// Plot the configured columns against the step column on log-log axes.
///
/// Columns are validated first. Points with a non-positive coordinate have
/// no place on a log axis and are left out.
pub fn build_loss_figure(table: &LossTable, cfg: &LossCurveConfig) -> Result<Figure, LossCurveError> {
    let columns = table.series_against(&cfg.step_column, &cfg.columns)?;
    let palette = generate_palette(columns.len());

    let series: Vec<Series> = columns
        .into_iter()
        .zip(palette)
        .map(|((name, points), color)| {
            let kept: Vec<(f64, f64)> = points
                .into_iter()
                .filter(|&(x, y)| x > 0.0 && y > 0.0 && x.is_finite() && y.is_finite())
                .collect();
            Series {
                group: name.clone(),
                label: Some(name),
                points: kept,
                color,
                dashed: false,
                width: LINE_WIDTH_PT,
            }
        })
        .collect();

    let x_range = log_range(series.iter().flat_map(|s| s.points.iter().map(|p| p.0)));
    let y_range = log_range(series.iter().flat_map(|s| s.points.iter().map(|p| p.1)));

    Ok(Figure {
        title: "Learning curve".into(),
        x_desc: Some("Training steps".into()),
        y_desc: Some("Loss".into()),
        x_range,
        y_range,
        scale: AxisScale::LogLog,
        x_ticks: Vec::new(),
        fixed_x_ticks: false,
        guides: Vec::new(),
        series,
        text_pt: TEXT_PT,
    })
}

/// Positive range padded by a small factor on each side.
fn log_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    match finite_bounds(values) {
        Some((lo, hi)) if hi > lo => lo / 1.2..hi * 1.2,
        Some((v, _)) => v / 10.0..v * 10.0,
        None => 1.0..10.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::lcurve::parse_loss_table;

    const LOG: &str = "\
# step rmse_e_val rmse_e_trn rmse_f_val rmse_f_trn lr
0    0.5   0.4   0.6   0.7   1e-3
100  0.1   0.09  0.2   0.25  1e-3
1000 0.01  0.02  0.05  0.06  5e-4
";

    #[test]
    fn one_legend_entry_per_column() {
        let table = parse_loss_table(LOG).unwrap();
        let fig = build_loss_figure(&table, &LossCurveConfig::default()).unwrap();
        let labels: Vec<&str> = fig.legend_entries().iter().map(|e| e.0).collect();
        assert_eq!(labels, vec!["rmse_e_val", "rmse_e_trn", "rmse_f_val", "rmse_f_trn"]);
        assert_eq!(fig.scale, AxisScale::LogLog);
    }

    #[test]
    fn step_zero_is_dropped_from_log_axes() {
        let table = parse_loss_table(LOG).unwrap();
        let fig = build_loss_figure(&table, &LossCurveConfig::default()).unwrap();
        assert!(fig.series.iter().all(|s| s.points.len() == 2));
        assert!(fig.x_range.start > 0.0);
        assert!(fig.x_range.start < 100.0 && fig.x_range.end > 1000.0);
    }

    #[test]
    fn unknown_column_fails_before_plotting() {
        let table = parse_loss_table(LOG).unwrap();
        let cfg = LossCurveConfig {
            columns: vec!["rmse_v_val".into()],
            ..LossCurveConfig::default()
        };
        assert!(matches!(
            build_loss_figure(&table, &cfg),
            Err(LossCurveError::MissingColumn { .. })
        ));
    }
}
