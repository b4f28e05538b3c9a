use eframe::egui::{self, Color32, Grid, RichText, Ui};

use crate::data::compare::{CompareError, ComparisonResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – symbol input and test summary
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Gene comparison");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ui.strong("Gene symbol");
    let response = ui.text_edit_singleline(&mut state.symbol_input);

    // Compare is the only trigger: button click, or Enter in the field.
    // Typing alone never recomputes.
    let clicked = ui.button("Compare").clicked();
    let entered = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
    if clicked || entered {
        state.run_comparison();
    }

    ui.separator();

    match &state.outcome {
        None => {
            ui.label("Enter a gene symbol and press Compare.");
        }
        Some(Ok(result)) => summary_block(ui, state, result),
        Some(Err(err)) => error_block(ui, err),
    }
}

/// Statistical summary for a computed comparison.
fn summary_block(ui: &mut Ui, state: &AppState, result: &ComparisonResult) {
    ui.strong(format!("{}  ({})", result.symbol, result.probe_id));
    ui.add_space(4.0);

    Grid::new("group_summary").striped(true).show(ui, |ui: &mut Ui| {
        ui.label("group");
        ui.label("n");
        ui.label("mean");
        ui.label("median");
        ui.end_row();

        for group in &result.groups {
            let mut label = RichText::new(&group.label);
            if let Some(cm) = &state.color_map {
                label = label.color(cm.color_for(&group.label));
            }
            ui.label(label);
            ui.label(group.n.to_string());
            ui.label(format!("{:.3}", group.mean));
            ui.label(format!("{:.3}", group.box_stats.median));
            ui.end_row();
        }
    });

    ui.add_space(8.0);
    ui.strong("Welch two-sample t-test");
    ui.label(format!("t = {:.4}", result.test.t));
    ui.label(format!("df = {:.2}", result.test.df));

    let p_text = if result.test.p < 0.001 {
        format!("p = {:.2e}", result.test.p)
    } else {
        format!("p = {:.4}", result.test.p)
    };
    if result.test.p < 0.05 {
        ui.label(RichText::new(p_text).color(Color32::LIGHT_GREEN));
    } else {
        ui.label(p_text);
    }
}

/// Placeholder shown when the comparison could not be computed.
fn error_block(ui: &mut Ui, err: &CompareError) {
    match err {
        CompareError::SymbolNotFound(symbol) => {
            ui.label(format!("Symbol '{symbol}' not found."));
        }
        other => {
            ui.label(RichText::new(format!("Cannot compare: {other}")).color(Color32::RED));
        }
    }
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
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} probes × {} samples  ({})",
                ds.len(),
                ds.n_samples(),
                ds.group_levels().join(" / ")
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open expression dataset")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.loading = true;
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} probes over {} samples, groups {:?}",
                    dataset.len(),
                    dataset.n_samples(),
                    dataset.group_levels()
                );
                state.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
                state.loading = false;
            }
        }
    }
}
