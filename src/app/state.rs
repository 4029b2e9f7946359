// ReelMend - app/state.rs
//
// Application state management.  Holds the user's inputs, the per-phase
// output panes and progress, the status line and the notice queue.
// Owned by the eframe::App implementation, which hands it to the job
// controller as the presentation surface.

use crate::app::job::JobRequest;
use crate::app::surface::PresentationSurface;
use crate::core::model::{Notice, Phase, RepairSettings};
use crate::core::text;
use crate::util::constants;
use std::collections::VecDeque;

/// Tabs of the main window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Repair,
    Analyze,
    Settings,
    About,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Repair, Tab::Analyze, Tab::Settings, Tab::About];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Repair => "Repair",
            Tab::Analyze => "Analyze",
            Tab::Settings => "Settings",
            Tab::About => "About",
        }
    }
}

/// Top-level application state.
#[derive(Debug)]
pub struct AppState {
    /// Reference (known-good) file path as typed or picked.
    pub reference_input: String,

    /// Folder of truncated files as typed or picked.
    pub target_input: String,

    /// File to analyze as typed or picked.
    pub analyze_input: String,

    /// Output pane text per phase.
    panes: [String; Phase::COUNT],

    /// Set when a pane grew since the last frame.
    scroll_to_bottom: [bool; Phase::COUNT],

    /// Progress per phase (0-100).
    progress: [u8; Phase::COUNT],

    /// Status message for the status bar.
    pub status_message: String,

    /// Whether the start buttons accept clicks.
    pub controls_enabled: bool,

    /// Notices waiting to be acknowledged, oldest first.
    notices: VecDeque<Notice>,

    /// Settings applied to the next job.
    pub settings: RepairSettings,

    /// Currently selected tab.
    pub tab: Tab,

    /// A start button was clicked; picked up by the app on the next frame.
    pub pending_job: Option<JobRequest>,

    /// The job controller asked the window to close.
    pub quit_requested: bool,

    pub dark_mode: bool,

    /// Whether debug mode is enabled.
    pub debug_mode: bool,
}

impl AppState {
    pub fn new(settings: RepairSettings, dark_mode: bool, debug_mode: bool) -> Self {
        Self {
            reference_input: String::new(),
            target_input: String::new(),
            analyze_input: String::new(),
            panes: Default::default(),
            scroll_to_bottom: [false; Phase::COUNT],
            progress: [0; Phase::COUNT],
            status_message: "Ready. Pick a reference file and a folder to repair.".to_string(),
            controls_enabled: true,
            notices: VecDeque::new(),
            settings,
            tab: Tab::default(),
            pending_job: None,
            quit_requested: false,
            dark_mode,
            debug_mode,
        }
    }

    pub fn pane_text(&self, phase: Phase) -> &str {
        &self.panes[phase.index()]
    }

    pub fn progress(&self, phase: Phase) -> u8 {
        self.progress[phase.index()]
    }

    /// Return and reset the "pane grew" flag of `phase`.
    pub fn take_scroll_request(&mut self, phase: Phase) -> bool {
        std::mem::take(&mut self.scroll_to_bottom[phase.index()])
    }

    /// The notice currently on screen, if any.
    pub fn current_notice(&self) -> Option<&Notice> {
        self.notices.front()
    }

    /// Acknowledge the notice currently on screen.
    pub fn dismiss_notice(&mut self) {
        self.notices.pop_front();
    }

    pub fn pending_notices(&self) -> usize {
        self.notices.len()
    }

    /// Queue a repair of the current inputs.
    pub fn request_repair(&mut self) {
        self.pending_job = Some(JobRequest::Repair {
            reference: self.reference_input.clone(),
            target_dir: self.target_input.clone(),
        });
    }

    /// Queue an analysis of the current input.
    pub fn request_analyze(&mut self) {
        self.pending_job = Some(JobRequest::Analyze {
            file: self.analyze_input.clone(),
        });
    }
}

impl PresentationSurface for AppState {
    fn set_text(&mut self, phase: Phase, text: &str) {
        let pane = &mut self.panes[phase.index()];
        pane.clear();
        pane.push_str(text);
        text::trim_front_to(pane, constants::MAX_PANE_TEXT_BYTES);
    }

    fn append_text(&mut self, phase: Phase, text: &str) {
        let pane = &mut self.panes[phase.index()];
        pane.push_str(text);
        text::trim_front_to(pane, constants::MAX_PANE_TEXT_BYTES);
        self.scroll_to_bottom[phase.index()] = true;
    }

    fn set_progress(&mut self, phase: Phase, percentage: u8) {
        self.progress[phase.index()] = percentage.min(100);
    }

    fn set_controls_enabled(&mut self, enabled: bool) {
        self.controls_enabled = enabled;
    }

    fn show_blocking_message(&mut self, notice: Notice) {
        tracing::debug!(title = notice.title(), "Notice queued");
        self.notices.push_back(notice);
    }

    fn set_status(&mut self, status: &str) {
        self.status_message = status.to_string();
    }

    fn quit(&mut self) {
        self.quit_requested = true;
    }
}
