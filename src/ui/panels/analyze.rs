// ReelMend - ui/panels/analyze.rs
//
// Analyze tab: prints the atom tree of one file.

use crate::app::state::AppState;
use crate::core::model::Phase;
use crate::ui::panels::output;

/// Render the Analyze tab.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Analyze a file");
    ui.add_space(8.0);

    ui.horizontal(|ui| {
        ui.label("File:");
        ui.add(
            egui::TextEdit::singleline(&mut state.analyze_input)
                .hint_text("Any MP4/MOV file")
                .desired_width(ui.available_width() - 180.0),
        );
        if ui.button("Browse\u{2026}").clicked() {
            if let Some(path) = rfd::FileDialog::new().pick_file() {
                state.analyze_input = path.display().to_string();
            }
        }
        if ui
            .add_enabled(state.controls_enabled, egui::Button::new("Analyze"))
            .clicked()
        {
            state.request_analyze();
        }
    });
    ui.add_space(6.0);

    output::render(ui, state, Phase::Analyze);
}
