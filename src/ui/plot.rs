use eframe::egui::{Color32, Ui};
use egui_plot::{Corner, GridMark, Legend, Line, LineStyle, Plot, PlotPoints, VLine};

use crate::figure::AxisScale;
use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Figure plot (central panel)
// ---------------------------------------------------------------------------

/// Render the current figure in the central panel. Log-log figures are
/// drawn in log10 space with the axes labelled in data units.
pub fn figure_plot(ui: &mut Ui, state: &ViewerState) {
    let figure = &state.figure;
    let log = figure.scale == AxisScale::LogLog;
    let map = move |v: f64| if log { v.log10() } else { v };

    let mut plot = Plot::new("figure_plot")
        .legend(Legend::default().position(Corner::RightTop))
        .include_x(map(figure.x_range.start))
        .include_x(map(figure.x_range.end))
        .include_y(map(figure.y_range.start))
        .include_y(map(figure.y_range.end))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    if let Some(desc) = &figure.x_desc {
        plot = plot.x_axis_label(desc.clone());
    }
    if let Some(desc) = &figure.y_desc {
        plot = plot.y_axis_label(desc.clone());
    }

    if log {
        plot = plot
            .x_axis_formatter(|mark, _range| format!("{:.0e}", 10f64.powf(mark.value)))
            .y_axis_formatter(|mark, _range| format!("{:.1e}", 10f64.powf(mark.value)));
    } else if figure.fixed_x_ticks {
        // Grid and labels only at the high-symmetry points.
        let ticks = figure.x_ticks.clone();
        let span = (figure.x_range.end - figure.x_range.start).abs().max(f64::EPSILON);
        let marks: Vec<GridMark> = ticks
            .iter()
            .map(|t| GridMark {
                value: t.value,
                step_size: span,
            })
            .collect();
        plot = plot
            .x_grid_spacer(move |_input| marks.clone())
            .x_axis_formatter(move |mark, _range| {
                ticks
                    .iter()
                    .find(|t| (t.value - mark.value).abs() <= span * 1e-9)
                    .map(|t| t.label.clone())
                    .unwrap_or_default()
            });
    }

    plot.show(ui, |plot_ui| {
        for &idx in &state.visible_indices {
            let series = &figure.series[idx];

            let points: PlotPoints = series
                .points
                .iter()
                .map(|&(x, y)| [map(x), map(y)])
                .collect();

            let mut line = Line::new(points)
                .color(Color32::from(series.color))
                .width(series.width as f32);
            if series.dashed {
                line = line.style(LineStyle::dashed_loose());
            }
            // Unnamed lines stay out of the legend.
            if let Some(label) = &series.label {
                line = line.name(label);
            }

            plot_ui.line(line);
        }

        for &x in &figure.guides {
            plot_ui.vline(
                VLine::new(map(x))
                    .color(Color32::GRAY)
                    .style(LineStyle::dashed_dense()),
            );
        }
    });
}
