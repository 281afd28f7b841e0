use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::{Accepted, Dimension, FilterSelection};
use crate::data::model::{Pclass, Port, Sex, Survival};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// What the user did inside one checkbox group.
enum GroupAction {
    SelectAll,
    SelectNone,
    Toggled,
}

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Please Filter Here:");
    ui.separator();

    if state.dataset().is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    let mut actions: Vec<(Dimension, GroupAction)> = Vec::new();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let selection = &mut state.selection;

            let survival: Vec<(Survival, String)> =
                Survival::ALL.into_iter().map(|s| (s, s.to_string())).collect();
            actions.extend(checkbox_group(ui, "Survival Status:", &survival, selection));

            let pclass: Vec<(Pclass, String)> =
                Pclass::ALL.into_iter().map(|c| (c, c.to_string())).collect();
            actions.extend(checkbox_group(ui, "Passenger Class:", &pclass, selection));

            let sex: Vec<(Sex, String)> =
                Sex::ALL.into_iter().map(|s| (s, s.label().to_string())).collect();
            actions.extend(checkbox_group(ui, "Gender:", &sex, selection));

            let ports: Vec<(Port, String)> =
                Port::ALL.into_iter().map(|p| (p, p.name().to_string())).collect();
            actions.extend(checkbox_group(ui, "Embarked Port:", &ports, selection));
        });

    // Apply after the widgets release their borrow of the selection.
    let mut toggled = false;
    for (dimension, action) in actions {
        match action {
            GroupAction::SelectAll => state.select_all(dimension),
            GroupAction::SelectNone => state.select_none(dimension),
            GroupAction::Toggled => toggled = true,
        }
    }
    if toggled {
        state.refilter();
    }
}

/// One titled block of checkboxes with All / None shortcuts.
fn checkbox_group<T: Accepted>(
    ui: &mut Ui,
    title: &str,
    options: &[(T, String)],
    selection: &mut FilterSelection,
) -> Option<(Dimension, GroupAction)> {
    let mut action = None;

    ui.add_space(4.0);
    ui.horizontal(|ui: &mut Ui| {
        let accepted = T::accepted(selection).len();
        ui.strong(format!("{title}  ({accepted}/{})", options.len()));
        if ui.small_button("All").clicked() {
            action = Some(GroupAction::SelectAll);
        }
        if ui.small_button("None").clicked() {
            action = Some(GroupAction::SelectNone);
        }
    });

    for (value, label) in options {
        let mut checked = selection.is_accepted(*value);
        if ui.checkbox(&mut checked, label.as_str()).changed() {
            selection.toggle(*value);
            action.get_or_insert(GroupAction::Toggled);
        }
    }
    ui.separator();
    action.map(|a| (T::DIMENSION, a))
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.can_reload(), egui::Button::new("Reload"))
                .clicked()
            {
                state.reload();
                ui.close_menu();
            }
            let can_export = state.summary.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export summary…"))
                .clicked()
            {
                export_summary_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(view)) = (state.dataset(), &state.view) {
            ui.label(format!(
                "{} passengers loaded, {} visible",
                ds.len(),
                view.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open passenger data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

pub fn export_summary_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export summary")
        .add_filter("JSON", &["json"])
        .set_file_name("summary.json")
        .save_file();

    if let Some(path) = file {
        match state.export_summary(&path) {
            Ok(()) => state.status_message = None,
            Err(e) => {
                log::error!("Failed to export summary: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
