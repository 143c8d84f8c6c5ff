use std::collections::BTreeSet;

use super::Figure;

// ---------------------------------------------------------------------------
// Group selection: which legend groups are shown
// ---------------------------------------------------------------------------

/// Selected legend groups. A series is drawn only when its group is selected.
pub type GroupSelection = BTreeSet<String>;

/// Initialise a [`GroupSelection`] with every group selected.
pub fn init_selection(figure: &Figure) -> GroupSelection {
    figure.groups().into_iter().collect()
}

/// Return indices of series whose group is selected.
pub fn visible_series(figure: &Figure, selection: &GroupSelection) -> Vec<usize> {
    figure
        .series
        .iter()
        .enumerate()
        .filter(|(_, s)| selection.contains(&s.group))
        .map(|(i, _)| i)
        .collect()
}
