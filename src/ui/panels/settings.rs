// ReelMend - ui/panels/settings.rs
//
// Settings tab: options applied to the next repair job.
// Values are validated against the bounds in util::constants.

use crate::app::state::AppState;
use crate::util::constants::{DEFAULT_SKIP_STEP, MAX_SKIP_STEP, MIN_SKIP_STEP};

/// Render the Settings tab.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Repair");
    ui.add_space(4.0);

    ui.checkbox(&mut state.settings.skip_unknown, "Skip unknown sequences");
    ui.label(
        egui::RichText::new(
            "Drops atoms of unrecognised type instead of copying them. \
             Try this when a repair stops with a premature end.",
        )
        .small()
        .weak(),
    );
    ui.add_space(6.0);

    ui.add_enabled_ui(state.settings.skip_unknown, |ui| {
        ui.horizontal(|ui| {
            ui.label("Step:");
            ui.add(
                egui::DragValue::new(&mut state.settings.step)
                    .range(MIN_SKIP_STEP..=MAX_SKIP_STEP)
                    .speed(1),
            );
            if state.settings.step != DEFAULT_SKIP_STEP
                && ui
                    .small_button("Reset")
                    .on_hover_text("Reset to the default step")
                    .clicked()
            {
                state.settings.step = DEFAULT_SKIP_STEP;
            }
        });
        ui.label(
            egui::RichText::new(format!(
                "Output files are named <name>_fixed{}.<ext>",
                state.settings.output_suffix()
            ))
            .small()
            .weak(),
        );
    });

    ui.add_space(10.0);
    ui.separator();
    ui.add_space(6.0);

    ui.heading("Appearance");
    ui.add_space(4.0);
    ui.checkbox(&mut state.dark_mode, "Dark mode");

    ui.add_space(10.0);
    ui.label(
        egui::RichText::new("Changes apply to the next job that is started.")
            .small()
            .weak(),
    );
}
