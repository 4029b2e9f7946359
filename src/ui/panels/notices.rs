// ReelMend - ui/panels/notices.rs
//
// Blocking notices.  The oldest queued notice is shown as a centred,
// non-collapsible window; the rest wait their turn.  The main window
// disables its panels while a notice is open.

use crate::app::state::AppState;
use crate::ui::theme;

/// Render the current notice, if any.
pub fn render(ctx: &egui::Context, state: &mut AppState) {
    let Some(notice) = state.current_notice().cloned() else {
        return;
    };
    let waiting = state.pending_notices().saturating_sub(1);

    let mut open = true;
    let mut acknowledged = false;
    egui::Window::new(
        egui::RichText::new(notice.title())
            .strong()
            .color(theme::notice_colour(&notice)),
    )
    .id(egui::Id::new("notice_window"))
    .open(&mut open)
    .collapsible(false)
    .resizable(false)
    .min_width(theme::NOTICE_WIDTH)
    .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
    .show(ctx, |ui| {
        ui.add_space(6.0);
        ui.label(notice.text());
        ui.add_space(10.0);
        ui.horizontal(|ui| {
            if waiting > 0 {
                ui.label(egui::RichText::new(format!("{waiting} more")).small().weak());
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("OK").clicked() {
                    acknowledged = true;
                }
            });
        });
    });

    if acknowledged || !open {
        state.dismiss_notice();
    }
}
