// ReelMend - ui/panels/about.rs
//
// About tab: application name, version and credits.

use crate::util::constants::{APP_NAME, APP_VERSION};

/// Render the About tab.
pub fn render(ui: &mut egui::Ui) {
    ui.add_space(24.0);

    // Large app name
    ui.vertical_centered(|ui| {
        ui.label(egui::RichText::new(format!("\u{1f39e}  {APP_NAME}")).size(28.0).strong());
        ui.add_space(4.0);
        ui.label(egui::RichText::new(format!("v{APP_VERSION}")).size(14.0).weak());
    });

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);

    ui.vertical_centered(|ui| {
        ui.label("Batch repair of truncated video recordings");
        ui.label("using a complete reference file from the same device.");
    });

    ui.add_space(8.0);
    ui.separator();
    ui.add_space(6.0);

    ui.vertical_centered(|ui| {
        ui.label(egui::RichText::new("MIT License").small().weak());
        ui.label(egui::RichText::new("Built with Rust & egui").small().weak());
    });
}
