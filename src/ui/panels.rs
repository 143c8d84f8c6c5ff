use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Left side panel – series visibility
// ---------------------------------------------------------------------------

/// Render the left panel: one checkbox per legend group.
pub fn side_panel(ui: &mut Ui, state: &mut ViewerState) {
    ui.heading("Series");
    ui.separator();

    if state.figure.series.is_empty() {
        ui.label("Nothing to show.");
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.select_all();
        }
        if ui.small_button("None").clicked() {
            state.select_none();
        }
    });

    // Group name with the colour of its first series.
    let groups: Vec<(String, Color32, usize)> = state
        .figure
        .groups()
        .into_iter()
        .map(|g| {
            let members: Vec<_> = state.figure.series.iter().filter(|s| s.group == g).collect();
            let color = members
                .first()
                .map(|s| Color32::from(s.color))
                .unwrap_or(Color32::GRAY);
            (g, color, members.len())
        })
        .collect();

    let mut toggled = None;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (group, color, count) in &groups {
                let mut checked = state.selection.contains(group);
                let text = RichText::new(format!("{group}  ({count})")).color(*color);
                if ui.checkbox(&mut checked, text).changed() {
                    toggled = Some(group.clone());
                }
            }
        });

    if let Some(group) = toggled {
        state.toggle_group(&group);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut ViewerState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Export SVG…").clicked() {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} curves, {} visible",
            state.figure.series.len(),
            state.visible_indices.len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if state.status_is_error {
                Color32::RED
            } else {
                Color32::DARK_GREEN
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn save_file_dialog(state: &mut ViewerState) {
    let file = rfd::FileDialog::new()
        .set_title("Export figure")
        .set_file_name("figure.svg")
        .add_filter("SVG", &["svg"])
        .save_file();

    if let Some(path) = file {
        if let Some(written) = state.export_svg(&path) {
            log::info!("Exported {} curves to {}", state.visible_indices.len(), written.display());
        }
    }
}
