// ReelMend - ui/panels/output.rs
//
// Read-only output pane with its progress bar.  Shared by the Repair and
// Analyze tabs; each renders the pane of its own phase.

use crate::app::state::AppState;
use crate::core::model::Phase;
use crate::ui::theme;

/// Render `phase`'s progress bar and output pane.
pub fn render(ui: &mut egui::Ui, state: &mut AppState, phase: Phase) {
    let percentage = state.progress(phase);
    let fill = if percentage >= 100 {
        theme::PROGRESS_DONE
    } else {
        theme::PROGRESS_ACTIVE
    };
    ui.add(
        egui::ProgressBar::new(f32::from(percentage) / 100.0)
            .show_percentage()
            .fill(fill),
    );
    ui.add_space(4.0);

    let scroll = state.take_scroll_request(phase);
    let mut text = state.pane_text(phase);
    egui::ScrollArea::vertical()
        .id_salt(("output_pane", phase.index()))
        .auto_shrink([false; 2])
        .min_scrolled_height(theme::OUTPUT_PANE_MIN_HEIGHT)
        .stick_to_bottom(true)
        .show(ui, |ui| {
            ui.add(
                egui::TextEdit::multiline(&mut text)
                    .font(egui::TextStyle::Monospace)
                    .desired_width(f32::INFINITY),
            );
            if scroll {
                ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
            }
        });
}
