// ReelMend - ui/theme.rs
//
// Colour scheme, notice colour mapping, and layout constants.
// No dependencies on app state or business logic.

use crate::core::model::Notice;
use egui::Color32;

/// Title colour for a notice window.
pub fn notice_colour(notice: &Notice) -> Color32 {
    match notice {
        Notice::Error(_) => Color32::from_rgb(220, 38, 38),     // Red 600
        Notice::Advisory(_) => Color32::from_rgb(217, 119, 6), // Amber 600
    }
}

/// Progress bar fill while a job runs and once it has finished.
pub const PROGRESS_ACTIVE: Color32 = Color32::from_rgb(37, 99, 235); // Blue 600
pub const PROGRESS_DONE: Color32 = Color32::from_rgb(22, 163, 74); // Green 600

/// Layout constants.
pub const WINDOW_SIZE: [f32; 2] = [900.0, 640.0];
pub const MIN_WINDOW_SIZE: [f32; 2] = [640.0, 420.0];
pub const INPUT_LABEL_WIDTH: f32 = 120.0;
pub const OUTPUT_PANE_MIN_HEIGHT: f32 = 200.0;
pub const NOTICE_WIDTH: f32 = 380.0;
