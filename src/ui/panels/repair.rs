// ReelMend - ui/panels/repair.rs
//
// Repair tab: reference file and truncated folder inputs, the Repair
// button, and the repair output pane.

use crate::app::state::AppState;
use crate::core::model::Phase;
use crate::ui::panels::output;
use crate::ui::theme;

/// Render the Repair tab.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Batch repair");
    ui.label(
        egui::RichText::new(
            "Every file directly inside the folder is repaired against the reference file.",
        )
        .small()
        .weak(),
    );
    ui.add_space(8.0);

    egui::Grid::new("repair_inputs")
        .num_columns(3)
        .spacing([8.0, 6.0])
        .show(ui, |ui| {
            ui.add_sized(
                [theme::INPUT_LABEL_WIDTH, 20.0],
                egui::Label::new("Reference file:"),
            );
            ui.add(
                egui::TextEdit::singleline(&mut state.reference_input)
                    .hint_text("A complete file recorded by the same device")
                    .desired_width(f32::INFINITY),
            );
            if ui.button("Browse\u{2026}").clicked() {
                if let Some(path) = rfd::FileDialog::new().pick_file() {
                    state.reference_input = path.display().to_string();
                }
            }
            ui.end_row();

            ui.add_sized(
                [theme::INPUT_LABEL_WIDTH, 20.0],
                egui::Label::new("Truncated folder:"),
            );
            ui.add(
                egui::TextEdit::singleline(&mut state.target_input)
                    .hint_text("Folder holding the broken files")
                    .desired_width(f32::INFINITY),
            );
            if ui.button("Browse\u{2026}").clicked() {
                if let Some(path) = rfd::FileDialog::new().pick_folder() {
                    state.target_input = path.display().to_string();
                }
            }
            ui.end_row();
        });

    ui.add_space(6.0);
    ui.horizontal(|ui| {
        let button = ui.add_enabled(state.controls_enabled, egui::Button::new("Repair"));
        if button.clicked() {
            state.request_repair();
        }
        if state.settings.skip_unknown {
            ui.label(
                egui::RichText::new(format!(
                    "skipping unknown sequences (suffix {})",
                    state.settings.output_suffix()
                ))
                .small()
                .weak(),
            );
        }
    });
    ui.add_space(6.0);

    output::render(ui, state, Phase::Repair);
}
