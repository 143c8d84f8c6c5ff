use std::path::{Path, PathBuf};

use crate::config::FigureConfig;
use crate::figure::filter::{init_selection, visible_series, GroupSelection};
use crate::figure::Figure;
use crate::render;

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// The full viewer state, independent of rendering.
pub struct ViewerState {
    /// Figure being shown.
    pub figure: Figure,

    /// Geometry used when the figure is exported again.
    pub geometry: FigureConfig,

    /// Legend groups currently shown.
    pub selection: GroupSelection,

    /// Indices of series passing the current selection (cached).
    pub visible_indices: Vec<usize>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
    pub status_is_error: bool,
}

impl ViewerState {
    pub fn new(figure: Figure, geometry: FigureConfig) -> Self {
        let selection = init_selection(&figure);
        let visible_indices = visible_series(&figure, &selection);
        Self {
            figure,
            geometry,
            selection,
            visible_indices,
            status_message: None,
            status_is_error: false,
        }
    }

    /// Recompute `visible_indices` after a selection change.
    pub fn refilter(&mut self) {
        self.visible_indices = visible_series(&self.figure, &self.selection);
    }

    /// Toggle one legend group on or off.
    pub fn toggle_group(&mut self, group: &str) {
        if !self.selection.remove(group) {
            self.selection.insert(group.to_string());
        }
        self.refilter();
    }

    pub fn select_all(&mut self) {
        self.selection = init_selection(&self.figure);
        self.refilter();
    }

    pub fn select_none(&mut self) {
        self.selection.clear();
        self.refilter();
    }

    /// Copy of the figure restricted to the visible series.
    pub fn visible_figure(&self) -> Figure {
        let mut figure = self.figure.clone();
        figure.series = self
            .visible_indices
            .iter()
            .map(|&i| self.figure.series[i].clone())
            .collect();
        figure
    }

    /// Write what is on screen to `path` and report the outcome.
    pub fn export_svg(&mut self, path: &Path) -> Option<PathBuf> {
        match render::write_svg(&self.visible_figure(), path, &self.geometry) {
            Ok(written) => {
                self.status_message = Some(format!("Saved {}", written.display()));
                self.status_is_error = false;
                Some(written)
            }
            Err(e) => {
                log::error!("Failed to export figure: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                self.status_is_error = true;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{default_styles, StyleMap};
    use crate::data::phonon::read_branches_from_str;
    use crate::figure::phonon::comparison_figure;

    fn state() -> ViewerState {
        let dft = read_branches_from_str("0.0 1.0\n1.0 2.0\n\n0.0 3.0\n1.0 4.0\n", "DFT");
        let dp = read_branches_from_str("0.0 1.1\n1.0 2.1\n", "DP");
        let methods = vec!["DFT".to_string(), "DP".to_string()];
        let styles = StyleMap::new(&methods, &default_styles());
        let fig = comparison_figure(&[0.0, 1.0], &[dft, dp], &[], &styles);
        ViewerState::new(
            fig,
            FigureConfig {
                width_in: 4.0,
                height_in: 3.0,
                dpi: 72,
            },
        )
    }

    #[test]
    fn groups_toggle_visibility() {
        let mut s = state();
        assert_eq!(s.visible_indices, vec![0, 1, 2]);
        s.toggle_group("DFT");
        assert_eq!(s.visible_indices, vec![2]);
        assert_eq!(s.visible_figure().series.len(), 1);
        s.toggle_group("DFT");
        assert_eq!(s.visible_indices.len(), 3);
        s.select_none();
        assert!(s.visible_indices.is_empty());
        s.select_all();
        assert_eq!(s.visible_indices.len(), 3);
    }

    #[test]
    fn export_reports_written_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = state();
        let written = s.export_svg(&dir.path().join("shown.svg")).unwrap();
        assert!(written.is_file());
        assert!(!s.status_is_error);
    }
}
