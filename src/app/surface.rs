// ReelMend - app/surface.rs
//
// The presentation boundary.  Everything the job machinery does to the
// screen goes through this trait, and only ever on the owning context: the
// egui frame loop in the GUI, the tick loop in headless mode, or a recording
// double in tests.

use crate::core::model::{Notice, Phase};

/// Operations the job machinery needs from a front-end.
pub trait PresentationSurface {
    /// Replace the contents of a phase's output pane.
    fn set_text(&mut self, phase: Phase, text: &str);

    /// Append to a phase's output pane.
    fn append_text(&mut self, phase: Phase, text: &str);

    /// Set a phase's progress indicator (0-100).
    fn set_progress(&mut self, phase: Phase, percentage: u8);

    /// Enable or disable the start controls of every phase.
    fn set_controls_enabled(&mut self, enabled: bool);

    /// Show a notice the user has to acknowledge.
    fn show_blocking_message(&mut self, notice: Notice);

    /// Update the one-line status label.
    fn set_status(&mut self, status: &str);

    /// Ask the front-end to close.
    fn quit(&mut self);
}
