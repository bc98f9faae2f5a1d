use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use toxview::data::export::{write_csv, EXPORT_FILE_NAME};
use toxview::data::filter::{filter, FilterableColumn};

use crate::state::{AppState, FilterOutcome, Page};

// ---------------------------------------------------------------------------
// Left side panel – navigation and filter inputs
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("PFASTox");
    ui.separator();

    let mut page = state.page;
    for p in Page::ALL {
        ui.radio_value(&mut page, p, p.label());
    }
    if page != state.page {
        state.open_page(page);
    }

    if state.page != Page::Filter {
        return;
    }

    ui.add_space(8.0);
    ui.strong("Filter");
    ui.separator();

    // ---- Column selector ----
    let mut column = state.filter_column;
    egui::ComboBox::from_label("Column")
        .selected_text(column.name())
        .show_ui(ui, |ui: &mut Ui| {
            for c in FilterableColumn::ALL {
                ui.selectable_value(&mut column, c, c.name());
            }
        });
    state.set_filter_column(column);

    // ---- Free-text pattern ----
    ui.label(format!("Enter a {} value", state.filter_column));
    let mut changed = ui.text_edit_singleline(&mut state.typed_pattern).changed();

    // ---- Picker over distinct values ----
    ui.label(format!("or pick from {}", state.filter_column));
    let picked_label = state.picked_value.clone().unwrap_or_default();
    egui::ComboBox::from_id_salt("picked_value")
        .selected_text(&picked_label)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            ScrollArea::vertical().max_height(300.0).show(ui, |ui: &mut Ui| {
                if ui
                    .selectable_label(state.picked_value.is_none(), "")
                    .clicked()
                {
                    state.picked_value = None;
                    changed = true;
                }
                for val in &state.distinct_values {
                    let selected = state.picked_value.as_deref() == Some(val.as_str());
                    if ui.selectable_label(selected, val).clicked() {
                        state.picked_value = Some(val.clone());
                        changed = true;
                    }
                }
            });
        });

    if changed {
        state.refilter();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Data", |ui: &mut Ui| {
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
            let can_export =
                state.page == Page::Filter && matches!(state.outcome, FilterOutcome::Matches(_));
            if ui
                .add_enabled(can_export, egui::Button::new("Export CSV…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(RichText::new(state.source.location.to_string()).weak());

        if let Some(ds) = &state.dataset {
            ui.separator();
            match &state.outcome {
                FilterOutcome::Matches(idx) if state.page == Page::Filter => {
                    ui.label(format!("{} records loaded, {} matching", ds.len(), idx.len()));
                }
                _ => {
                    ui.label(format!("{} records loaded", ds.len()));
                }
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Save dialog
// ---------------------------------------------------------------------------

pub fn export_dialog(state: &mut AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };
    let result = match filter(dataset, &state.request()) {
        Ok(result) => result,
        Err(e) => {
            state.status_message = Some(format!("Export failed: {e}"));
            return;
        }
    };
    let Some(view) = result.view() else {
        return;
    };

    let file = rfd::FileDialog::new()
        .set_title("Export filtered data")
        .set_file_name(EXPORT_FILE_NAME)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = write_csv(view, &path) {
            log::error!("Failed to export {}: {e}", path.display());
            state.status_message = Some(format!("Export failed: {e}"));
        }
    }
}
