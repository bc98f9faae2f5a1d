use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use toxview::data::model::Dataset;

use crate::state::{AppState, FilterOutcome, Page};

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the central panel for the current page.
pub fn central_panel(ui: &mut Ui, state: &AppState) {
    match state.page {
        Page::Home => home(ui),
        Page::Preview => preview(ui, state),
        Page::Filter => filtered(ui, state),
    }
}

fn home(ui: &mut Ui) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(40.0);
        ui.heading(RichText::new("PFAS Toxicity Database").size(26.0).strong());
        ui.add_space(20.0);
        ui.label(
            RichText::new(
                "Ecotoxicity data for about 5000 PFAS chemicals across four fish species.",
            )
            .size(18.0),
        );
        ui.add_space(10.0);
        ui.label("Use \"Data preview\" to browse the full table or \"Data filter\" to search and export it.");
    });
}

fn preview(ui: &mut Ui, state: &AppState) {
    let Some(ds) = &state.dataset else {
        not_loaded(ui, state);
        return;
    };
    ui.heading("All data");
    let all: Vec<usize> = (0..ds.len()).collect();
    records_table(ui, ds, &all);
}

fn filtered(ui: &mut Ui, state: &AppState) {
    let Some(ds) = &state.dataset else {
        not_loaded(ui, state);
        return;
    };
    match &state.outcome {
        FilterOutcome::AwaitingInput => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.label("Enter or pick a value to filter.");
            });
        }
        FilterOutcome::Error(msg) => {
            ui.colored_label(egui::Color32::RED, msg);
        }
        FilterOutcome::Matches(indices) => {
            let request = state.request();
            ui.heading(format!("Results: {} ~ {}", request.column, request.pattern));
            if indices.is_empty() {
                ui.label("No records match.");
            } else {
                records_table(ui, ds, indices);
            }
        }
    }
}

fn not_loaded(ui: &mut Ui, state: &AppState) {
    ui.centered_and_justified(|ui: &mut Ui| {
        let text = state
            .status_message
            .as_deref()
            .unwrap_or("No dataset loaded  (Data → Reload)");
        ui.heading(text);
    });
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Scrollable, striped table of the records at `indices`.
fn records_table(ui: &mut Ui, dataset: &Dataset, indices: &[usize]) {
    let columns = dataset.column_names();
    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .columns(Column::auto().at_least(60.0).clip(true), columns.len())
            .header(ROW_HEIGHT + 4.0, |mut header| {
                for name in columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, indices.len(), |mut row| {
                    let Some(record) = indices
                        .get(row.index())
                        .and_then(|&i| dataset.records().get(i))
                    else {
                        return;
                    };
                    for cell in record {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell.to_string());
                        });
                    }
                });
            });
    });
}
