//! Backend-neutral description of a plot.
//!
//! A [`Figure`] is built once from parsed data and handed either to the SVG
//! writer ([`crate::render`]) or to the interactive viewer ([`crate::app`]).

use std::ops::Range;

use crate::color::Rgb;

pub mod filter;
pub mod lcurve;
pub mod phonon;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisScale {
    Linear,
    /// Base-10 logarithmic on both axes.
    LogLog,
}

/// One polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Legend group (method name or log column); used for visibility toggles.
    pub group: String,
    /// Legend text; `None` keeps the series out of the legend.
    pub label: Option<String>,
    pub points: Vec<(f64, f64)>,
    pub color: Rgb,
    pub dashed: bool,
    /// Stroke width in points.
    pub width: f64,
}

/// Labelled x-axis tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub x_desc: Option<String>,
    pub y_desc: Option<String>,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
    pub scale: AxisScale,
    /// Explicit x ticks; empty means automatic ticks (or none when
    /// `fixed_x_ticks` is set).
    pub x_ticks: Vec<Tick>,
    pub fixed_x_ticks: bool,
    /// Vertical dashed guide lines.
    pub guides: Vec<f64>,
    pub series: Vec<Series>,
    /// Base text size in points.
    pub text_pt: f64,
}

impl Figure {
    /// Legend rows in drawing order: `(label, colour, dashed)`.
    pub fn legend_entries(&self) -> Vec<(&str, Rgb, bool)> {
        self.series
            .iter()
            .filter_map(|s| s.label.as_deref().map(|l| (l, s.color, s.dashed)))
            .collect()
    }

    /// Distinct legend groups in first-seen order.
    pub fn groups(&self) -> Vec<String> {
        let mut groups: Vec<String> = Vec::new();
        for s in &self.series {
            if !groups.contains(&s.group) {
                groups.push(s.group.clone());
            }
        }
        groups
    }
}

/// Widen a degenerate range so every backend can draw it.
pub(crate) fn non_empty(range: Range<f64>) -> Range<f64> {
    if range.end > range.start {
        range
    } else {
        range.start..range.start + 1.0
    }
}
