// ReelMend - app/console.rs
//
// Presentation surface for headless runs: pane text goes to `out`,
// notices, status and progress lines go to `err`.  Notices do not block;
// they are printed and the run carries on.

use crate::app::surface::PresentationSurface;
use crate::core::model::{Notice, Phase};
use std::io::Write;

/// Progress is printed once per this many percent.
const PROGRESS_STEP: u8 = 10;

/// Text-stream presentation surface.
pub struct ConsoleSurface<O: Write, E: Write> {
    out: O,
    err: E,
    last_progress: [Option<u8>; Phase::COUNT],
    errors_shown: usize,
    quit_requested: bool,
}

impl<O: Write, E: Write> ConsoleSurface<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self {
            out,
            err,
            last_progress: [None; Phase::COUNT],
            errors_shown: 0,
            quit_requested: false,
        }
    }

    /// Error notices printed so far.
    pub fn errors_shown(&self) -> usize {
        self.errors_shown
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Give back the underlying streams.
    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }

    // Console output is best effort: a closed pipe must not stop the job.
    fn write_out(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
    }

    fn write_err(&mut self, line: &str) {
        let _ = writeln!(self.err, "{line}");
    }
}

impl<O: Write, E: Write> PresentationSurface for ConsoleSurface<O, E> {
    fn set_text(&mut self, phase: Phase, text: &str) {
        // A console cannot clear what it already printed.
        self.last_progress[phase.index()] = None;
        if !text.is_empty() {
            self.write_out(text);
        }
    }

    fn append_text(&mut self, _phase: Phase, text: &str) {
        self.write_out(text);
    }

    fn set_progress(&mut self, phase: Phase, percentage: u8) {
        let step = percentage / PROGRESS_STEP;
        let slot = &mut self.last_progress[phase.index()];
        if slot.is_some_and(|last| last / PROGRESS_STEP == step) {
            return;
        }
        *slot = Some(percentage);
        self.write_err(&format!("[{phase}] {percentage}%"));
    }

    fn set_controls_enabled(&mut self, _enabled: bool) {}

    fn show_blocking_message(&mut self, notice: Notice) {
        if notice.is_error() {
            self.errors_shown += 1;
        }
        self.write_err(&format!("{}: {}", notice.title(), notice.text()));
    }

    fn set_status(&mut self, status: &str) {
        self.write_err(status);
    }

    fn quit(&mut self) {
        self.quit_requested = true;
    }
}
