use eframe::egui::{Color32, Ui};
use egui_plot::{BoxElem, BoxPlot, BoxSpread, Legend, Plot};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Comparison box plot (central panel)
// ---------------------------------------------------------------------------

/// Render the box plot of the last computed comparison.
pub fn comparison_plot(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a dataset to compare genes  (File → Open…)");
        });
        return;
    }

    let result = match &state.outcome {
        Some(Ok(result)) => result,
        _ => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Enter a gene symbol and press Compare");
            });
            return;
        }
    };

    Plot::new("comparison_plot")
        .legend(Legend::default())
        .x_axis_label(&result.symbol)
        .y_axis_label("Expression")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (i, group) in result.groups.iter().enumerate() {
                let color = state
                    .color_map
                    .as_ref()
                    .map(|cm| cm.color_for(&group.label))
                    .unwrap_or(Color32::LIGHT_BLUE);

                let stats = &group.box_stats;
                let elem = BoxElem::new(
                    i as f64,
                    BoxSpread::new(stats.min, stats.q1, stats.median, stats.q3, stats.max),
                )
                .name(format!("{}  (n={})", group.label, group.n))
                .fill(color.gamma_multiply(0.4))
                .stroke((1.5, color))
                .box_width(0.5)
                .whisker_width(0.3);

                plot_ui.box_plot(
                    BoxPlot::new(vec![elem])
                        .name(&group.label)
                        .color(color),
                );
            }
        });
}
