use std::collections::BTreeMap;
use std::ops::Range;

use anyhow::{bail, Result};

use super::{non_empty, AxisScale, Figure, Series, Tick};
use crate::color::{StyleMap, StyleSpec};
use crate::config::MethodSource;
use crate::data::model::{finite_bounds, MethodDataset};
use crate::data::phonon::read_branches;

const LINE_WIDTH_PT: f64 = 2.0;
const TEXT_PT: f64 = 28.0;

/// Parsed methods plus the figure drawn from them.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub figure: Figure,
    pub datasets: Vec<MethodDataset>,
}

/// Read every method's file and overlay them in one figure.
///
/// The first method is the reference: its high-symmetry points place the x
/// ticks and guide lines. Returns `Ok(None)` when the reference file does
/// not exist; other missing files are skipped.
pub fn build_comparison(
    sources: &[MethodSource],
    labels: &[String],
    styles: &BTreeMap<String, StyleSpec>,
) -> Result<Option<Comparison>> {
    let Some(reference) = sources.first() else {
        bail!("no methods configured");
    };
    if !reference.path.exists() {
        log::error!("reference method file not found: {reference}");
        return Ok(None);
    }

    let mut datasets = Vec::with_capacity(sources.len());
    for source in sources {
        if !source.path.exists() {
            log::warn!("skipping method, file not found: {source}");
            continue;
        }
        datasets.push(read_branches(&source.path, &source.name)?);
    }

    let reference_points = datasets[0].high_symmetry_points.clone();
    log::info!(
        "high-symmetry points from {}: {:?}",
        reference.name,
        reference_points
    );

    let names: Vec<String> = sources.iter().map(|s| s.name.clone()).collect();
    let style_map = StyleMap::new(&names, styles);
    let figure = comparison_figure(&reference_points, &datasets, labels, &style_map);
    Ok(Some(Comparison { figure, datasets }))
}

/// Lay out the comparison figure from already parsed datasets.
pub fn comparison_figure(
    reference_points: &[f64],
    datasets: &[MethodDataset],
    labels: &[String],
    styles: &StyleMap,
) -> Figure {
    let mut series = Vec::new();
    for ds in datasets {
        let style = styles.style_for(&ds.method);
        for branch in &ds.branches {
            series.push(Series {
                group: ds.method.clone(),
                label: (branch.index == 0).then(|| ds.method.clone()),
                points: branch.points(),
                color: style.color,
                dashed: style.dashed,
                width: LINE_WIDTH_PT,
            });
        }
    }

    Figure {
        title: "Phonon dispersion".into(),
        x_desc: None,
        y_desc: Some("Frequency (THz)".into()),
        x_range: q_range(reference_points, datasets),
        y_range: frequency_range(datasets),
        scale: AxisScale::Linear,
        x_ticks: symmetry_ticks(reference_points, labels),
        fixed_x_ticks: true,
        guides: reference_points.to_vec(),
        series,
        text_pt: TEXT_PT,
    }
}

/// Pair points with labels by position. Surplus labels are dropped with a
/// warning; points without a label get an empty one.
pub fn symmetry_ticks(points: &[f64], labels: &[String]) -> Vec<Tick> {
    if labels.len() != points.len() {
        log::warn!(
            "{} high-symmetry labels for {} points, labels truncated",
            labels.len(),
            points.len()
        );
    }
    points
        .iter()
        .enumerate()
        .map(|(i, &value)| Tick {
            value,
            label: labels.get(i).cloned().unwrap_or_default(),
        })
        .collect()
}

/// `min(0, 1.1 × min)` to `1.2 × max` over every method's frequencies.
pub fn frequency_range(datasets: &[MethodDataset]) -> Range<f64> {
    let bounds = finite_bounds(
        datasets
            .iter()
            .filter_map(MethodDataset::frequency_bounds)
            .flat_map(|(lo, hi)| [lo, hi]),
    );
    match bounds {
        Some((lo, hi)) => non_empty(f64::min(0.0, lo * 1.1)..hi * 1.2),
        None => 0.0..1.0,
    }
}

fn q_range(points: &[f64], datasets: &[MethodDataset]) -> Range<f64> {
    let bounds = finite_bounds(
        points.iter().copied().chain(
            datasets
                .iter()
                .filter_map(MethodDataset::q_bounds)
                .flat_map(|(lo, hi)| [lo, hi]),
        ),
    );
    match bounds {
        Some((lo, hi)) => non_empty(lo..hi),
        None => 0.0..1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::default_styles;
    use crate::data::phonon::read_branches_from_str;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn y_range_includes_zero_and_headroom() {
        let ds = read_branches_from_str("0.0 2.0\n1.0 10.0\n", "DFT");
        let r = frequency_range(&[ds]);
        assert_eq!(r.start, 0.0);
        assert!((r.end - 12.0).abs() < 1e-12);
    }

    #[test]
    fn y_range_extends_below_imaginary_modes() {
        let a = read_branches_from_str("0.0 -1.0\n1.0 5.0\n", "DFT");
        let b = read_branches_from_str("0.0 -2.0\n1.0 4.0\n", "DP");
        let r = frequency_range(&[a, b]);
        assert!((r.start + 2.2).abs() < 1e-12);
        assert!((r.end - 6.0).abs() < 1e-12);
    }

    #[test]
    fn y_range_without_samples_is_unit() {
        assert_eq!(frequency_range(&[]), 0.0..1.0);
        let all_negative = read_branches_from_str("0.0 -3.0\n", "DP");
        let r = frequency_range(&[all_negative]);
        assert!(r.end > r.start);
    }

    #[test]
    fn surplus_labels_are_truncated() {
        let ticks = symmetry_ticks(&[0.0, 0.5, 1.0], &labels(&["Γ", "M", "K", "Γ"]));
        assert_eq!(ticks.len(), 3);
        assert_eq!(ticks[2].label, "K");
    }

    #[test]
    fn missing_labels_are_blank() {
        let ticks = symmetry_ticks(&[0.0, 0.5], &labels(&["Γ"]));
        assert_eq!(ticks[1].label, "");
        assert!(symmetry_ticks(&[], &labels(&["Γ"])).is_empty());
    }

    #[test]
    fn one_legend_entry_per_method() {
        let text = "# End points of segments: 0.0 1.0\n0.0 0.0\n1.0 1.0\n\n0.0 2.0\n1.0 3.0\n";
        let ds = read_branches_from_str(text, "DFT");
        let points = ds.high_symmetry_points.clone();
        let styles = StyleMap::new(&["DFT".to_string()], &default_styles());
        let fig = comparison_figure(&points, &[ds], &labels(&["Γ", "M"]), &styles);

        assert_eq!(fig.series.len(), 2);
        assert_eq!(fig.legend_entries().len(), 1);
        assert_eq!(fig.legend_entries()[0].0, "DFT");
        assert_eq!(fig.guides, vec![0.0, 1.0]);
        assert_eq!(fig.x_ticks[1].label, "M");
        assert_eq!(fig.x_range, 0.0..1.0);
    }

    #[test]
    fn no_points_means_no_ticks() {
        let ds = read_branches_from_str("0.0 1.0\n0.5 2.0\n", "DFT");
        let styles = StyleMap::new(&["DFT".to_string()], &default_styles());
        let fig = comparison_figure(&[], &[ds], &labels(&["Γ", "M"]), &styles);
        assert!(fig.x_ticks.is_empty());
        assert!(fig.guides.is_empty());
        assert_eq!(fig.x_range, 0.0..0.5);
    }
}
